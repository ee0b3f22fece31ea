// src/models/enums.rs
//! Closed enumerations of the backend, all generated by define_status_enum!

use serde::{Deserialize, Serialize};

/// Generates a status/type enum with as_str, from_str, from_wire, is_valid, all_values, Display
macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $str_val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $vis enum $name {
            $( #[serde(rename = $str_val)] $variant ),+
        }

        impl $name {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $str_val ),+
                }
            }

            /// Lenient parse for user input: trims and ignores case.
            pub fn from_str(s: &str) -> Option<Self> {
                Self::from_wire(s.trim().to_lowercase().as_str())
            }

            /// Exact parse of a value sent by the backend.
            pub fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $( $str_val => Some($name::$variant), )+
                    _ => None,
                }
            }

            #[inline]
            pub fn is_valid(s: &str) -> bool {
                Self::from_str(s).is_some()
            }

            /// Wire values in declaration order
            pub const fn all_values() -> &'static [&'static str] {
                &[ $( $str_val ),+ ]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_str(s).ok_or_else(|| format!("Invalid {}: '{}'", stringify!($name), s))
            }
        }
    };
}

// ==================== USER ROLES ====================

define_status_enum! {
    /// Role assigned by the backend at registration
    pub enum UserRole {
        Student => "estudiante",
        Professor => "profesor",
        Staff => "personal",
        Admin => "admin",
    }
}

impl UserRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Professor => "Professor",
            UserRole::Staff => "Staff",
            UserRole::Admin => "Administrator",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Student
    }
}

// ==================== LABORATORY TYPES ====================

define_status_enum! {
    pub enum LabType {
        Electronics => "electronica",
        Hardware => "hardware",
        Telecommunications => "telecomunicaciones",
        Networks => "redes",
    }
}

// ==================== EQUIPMENT STATUSES ====================

define_status_enum! {
    /// Equipment lifecycle
    ///
    /// - Available: can be lent
    /// - InUse: currently lent or in a lab session
    /// - InMaintenance: has an open maintenance record
    /// - Decommissioned: retired from the inventory
    pub enum EquipmentStatus {
        Available => "disponible",
        InUse => "en_uso",
        InMaintenance => "en_mantenimiento",
        Decommissioned => "dado_de_baja",
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Available
    }
}

// ==================== LOAN STATUSES ====================

define_status_enum! {
    pub enum LoanStatus {
        Active => "activo",
        Returned => "devuelto",
        Overdue => "atrasado",
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Active
    }
}

// ==================== RESERVATION STATUSES ====================

define_status_enum! {
    pub enum ReservationStatus {
        Pending => "pendiente",
        Approved => "aprobada",
        Cancelled => "cancelada",
    }
}

impl Default for ReservationStatus {
    fn default() -> Self {
        ReservationStatus::Pending
    }
}
