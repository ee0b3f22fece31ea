// src/models/reservation.rs
use serde::{Deserialize, Serialize};

use super::{non_empty, opt_string, Record, ReservationStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabReservation {
    #[serde(rename = "reserva_id")]
    pub id: i64,
    #[serde(rename = "laboratorio_id", default)]
    pub laboratory_id: Option<i64>,
    #[serde(rename = "usuario_id", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "fecha_inicio", default)]
    pub starts_on: Option<String>,
    #[serde(rename = "fecha_fin", default)]
    pub ends_on: Option<String>,
    #[serde(rename = "proposito", default)]
    pub purpose: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: String,
    /// Joined by the personal report endpoint only.
    #[serde(rename = "laboratorio_nombre", default, skip_serializing_if = "Option::is_none")]
    pub laboratory_name: Option<String>,
}

impl LabReservation {
    pub fn parsed_status(&self) -> Option<ReservationStatus> {
        ReservationStatus::from_wire(&self.status)
    }
}

impl Record for LabReservation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "reserva_id" | "id" => Some(self.id.to_string()),
            "laboratorio_id" => self.laboratory_id.map(|id| id.to_string()),
            "usuario_id" => self.user_id.map(|id| id.to_string()),
            "fecha_inicio" => opt_string(&self.starts_on),
            "fecha_fin" => opt_string(&self.ends_on),
            "proposito" => opt_string(&self.purpose),
            "estado" => non_empty(&self.status),
            "laboratorio_nombre" => opt_string(&self.laboratory_name),
            _ => None,
        }
    }
}

/// Body of `GET /users/{id}/lab-reservas`; every list defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLabReport {
    #[serde(rename = "laboratorios_prestados", default)]
    pub lent_labs: Vec<LabReservation>,
    #[serde(rename = "laboratorios_no_entregados", default)]
    pub unreturned_labs: Vec<LabReservation>,
    #[serde(rename = "todas_reservas", default)]
    pub all_reservations: Vec<LabReservation>,
    #[serde(rename = "total_reservas", default)]
    pub total_reservations: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_report_defaults_missing_lists() {
        let report: UserLabReport = serde_json::from_str(
            r#"{"todas_reservas": [{"reserva_id": 1, "laboratorio_id": 2, "estado": "aprobada"}],
                "total_reservas": 1}"#,
        )
        .unwrap();
        assert_eq!(report.total_reservations, 1);
        assert!(report.lent_labs.is_empty());
        assert!(report.unreturned_labs.is_empty());
        assert_eq!(report.all_reservations[0].parsed_status(), Some(ReservationStatus::Approved));
    }
}
