// src/models/equipment.rs
use serde::{Deserialize, Serialize};

use super::{non_empty, opt_string, EquipmentStatus, Record};

// ==================== EQUIPMENT ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "equipo_id")]
    pub id: i64,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "codigo_inventario", default)]
    pub inventory_code: Option<String>,
    #[serde(rename = "categoria_id", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "laboratorio_id", default)]
    pub laboratory_id: Option<i64>,
    #[serde(rename = "estado", default)]
    pub status: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "fecha_adquisicion", default)]
    pub acquired_on: Option<String>,
}

impl Equipment {
    pub fn parsed_status(&self) -> Option<EquipmentStatus> {
        EquipmentStatus::from_wire(&self.status)
    }
}

impl Record for Equipment {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "equipo_id" | "id" => Some(self.id.to_string()),
            "nombre" => non_empty(&self.name),
            "codigo_inventario" => opt_string(&self.inventory_code),
            "categoria_id" => self.category_id.map(|id| id.to_string()),
            "laboratorio_id" => self.laboratory_id.map(|id| id.to_string()),
            "estado" => non_empty(&self.status),
            "descripcion" => opt_string(&self.description),
            "fecha_adquisicion" => opt_string(&self.acquired_on),
            _ => None,
        }
    }
}

// ==================== CATEGORIES ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentCategory {
    #[serde(rename = "categoria_id")]
    pub id: i64,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

impl Record for EquipmentCategory {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "categoria_id" | "id" => Some(self.id.to_string()),
            "nombre" => non_empty(&self.name),
            "descripcion" => opt_string(&self.description),
            _ => None,
        }
    }
}

// ==================== MAINTENANCE ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(rename = "mantenimiento_id")]
    pub id: i64,
    #[serde(rename = "equipo_id", default)]
    pub equipment_id: Option<i64>,
    #[serde(rename = "fecha_inicio", default)]
    pub started_on: Option<String>,
    #[serde(rename = "fecha_fin", default)]
    pub finished_on: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "tecnico", default)]
    pub technician: Option<String>,
    #[serde(rename = "costo", default)]
    pub cost: Option<f64>,
}

impl Record for MaintenanceRecord {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "mantenimiento_id" | "id" => Some(self.id.to_string()),
            "equipo_id" => self.equipment_id.map(|id| id.to_string()),
            "fecha_inicio" => opt_string(&self.started_on),
            "fecha_fin" => opt_string(&self.finished_on),
            "descripcion" => opt_string(&self.description),
            "tecnico" => opt_string(&self.technician),
            "costo" => self.cost.map(|c| format!("{:.2}", c)),
            _ => None,
        }
    }
}
