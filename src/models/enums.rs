use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Storage and wire form are both the lowercase string.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
});

str_enum!(MethodType {
    Card => "card",
    Insurance => "insurance",
});

str_enum!(RecordType {
    Consultation => "consultation",
    Prescription => "prescription",
    LabResult => "lab_result",
    Imaging => "imaging",
    Other => "other",
});

str_enum!(AdminTable {
    Users => "users",
    Doctors => "doctors",
    Services => "services",
    Appointments => "appointments",
    Payments => "payments",
    PaymentMethods => "payment_methods",
    Reviews => "reviews",
    Favorites => "favorites",
    HealthProfiles => "health_profiles",
    MedicalRecords => "medical_records",
});

impl AdminTable {
    /// The closed set of tables the admin explorer exposes.
    pub const ALL: [AdminTable; 10] = [
        AdminTable::Users,
        AdminTable::Doctors,
        AdminTable::Services,
        AdminTable::Appointments,
        AdminTable::Payments,
        AdminTable::PaymentMethods,
        AdminTable::Reviews,
        AdminTable::Favorites,
        AdminTable::HealthProfiles,
        AdminTable::MedicalRecords,
    ];
}
