// src/models/laboratory.rs
use serde::{Deserialize, Serialize};

use super::{non_empty, opt_string, LabType, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    #[serde(rename = "laboratorio_id")]
    pub id: i64,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "ubicacion", default)]
    pub location: Option<String>,
    #[serde(rename = "tipo_laboratorio", default)]
    pub lab_type: String,
    #[serde(rename = "capacidad", default)]
    pub capacity: Option<i64>,
    #[serde(rename = "responsable_id", default)]
    pub responsible_id: Option<i64>,
}

impl Laboratory {
    pub fn parsed_type(&self) -> Option<LabType> {
        LabType::from_wire(&self.lab_type)
    }

    /// A lab with a responsible user is treated as occupied.
    pub fn is_occupied(&self) -> bool {
        self.responsible_id.is_some()
    }
}

impl Record for Laboratory {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "laboratorio_id" | "id" => Some(self.id.to_string()),
            "nombre" => non_empty(&self.name),
            "ubicacion" => opt_string(&self.location),
            "tipo_laboratorio" => non_empty(&self.lab_type),
            "capacidad" => self.capacity.map(|c| c.to_string()),
            "responsable_id" => self.responsible_id.map(|id| id.to_string()),
            _ => None,
        }
    }
}
