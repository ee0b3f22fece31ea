// src/models/loan.rs
use serde::{Deserialize, Serialize};

use super::{non_empty, opt_string, LoanStatus, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(rename = "prestamo_id")]
    pub id: i64,
    #[serde(rename = "usuario_id", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "equipo_id", default)]
    pub equipment_id: Option<i64>,
    #[serde(rename = "fecha_prestamo", default)]
    pub loaned_on: Option<String>,
    #[serde(rename = "fecha_devolucion_prevista", default)]
    pub due_on: Option<String>,
    #[serde(rename = "fecha_devolucion_real", default)]
    pub returned_on: Option<String>,
    #[serde(rename = "estado", default)]
    pub status: String,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
}

impl Loan {
    pub fn parsed_status(&self) -> Option<LoanStatus> {
        LoanStatus::from_wire(&self.status)
    }
}

impl Record for Loan {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "prestamo_id" | "id" => Some(self.id.to_string()),
            "usuario_id" => self.user_id.map(|id| id.to_string()),
            "equipo_id" => self.equipment_id.map(|id| id.to_string()),
            "fecha_prestamo" => opt_string(&self.loaned_on),
            "fecha_devolucion_prevista" => opt_string(&self.due_on),
            "fecha_devolucion_real" => opt_string(&self.returned_on),
            "estado" => non_empty(&self.status),
            "notas" => opt_string(&self.notes),
            _ => None,
        }
    }
}

/// Body of `GET /users/{id}/loan-report`: loans and returns per day.
///
/// The three vectors are parallel; missing ones default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanActivityReport {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(rename = "prestamos", default)]
    pub loans: Vec<i64>,
    #[serde(rename = "devoluciones", default)]
    pub returns: Vec<i64>,
}

impl LoanActivityReport {
    pub fn total_loans(&self) -> i64 {
        self.loans.iter().sum()
    }

    pub fn total_returns(&self) -> i64 {
        self.returns.iter().sum()
    }

    /// Series lengths disagree; charts would misalign labels.
    pub fn is_ragged(&self) -> bool {
        self.loans.len() != self.dates.len() || self.returns.len() != self.dates.len()
    }
}
