//! Closed categorical domains per customer field, and the validated record type.
//!
//! Every literal the validator accepts and every categorical column the transform
//! encodes comes from this module.

mod record;

pub use record::{validate, RawCustomerRecord, RecordCandidate, DATE_FORMAT};
pub(crate) use record::parse_date;

use serde::{Serialize, Serializer};

/// A closed enumeration with a canonical English literal per variant.
pub trait Categorical: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn literal(self) -> &'static str;

    fn from_literal(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.literal() == value)
    }
}

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $lit:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Categorical for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn literal(self) -> &'static str {
                match self {
                    $($name::$variant => $lit),+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.literal())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.literal())
            }
        }
    };
}

categorical!(
    /// Contract term.
    ContractType {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
);

categorical!(
    PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
);

categorical!(
    /// Yes/No account attribute that cannot be "not connected" (billing, partner, dependents).
    BinaryFlag {
        Yes => "Yes",
        No => "No",
    }
);

categorical!(
    /// Optional service: active, inactive, or the customer is not connected to the parent service.
    ServiceFlag {
        Yes => "Yes",
        No => "No",
        NotConnected => "Not connected",
    }
);

impl ServiceFlag {
    pub fn is_active(self) -> bool {
        self == ServiceFlag::Yes
    }
}

/// Every categorical field of a raw customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    ContractType,
    PaymentMethod,
    PaperlessBilling,
    Partner,
    Dependents,
    MultipleLines,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 12] = [
        CategoricalField::ContractType,
        CategoricalField::PaymentMethod,
        CategoricalField::PaperlessBilling,
        CategoricalField::Partner,
        CategoricalField::Dependents,
        CategoricalField::MultipleLines,
        CategoricalField::OnlineSecurity,
        CategoricalField::OnlineBackup,
        CategoricalField::DeviceProtection,
        CategoricalField::TechSupport,
        CategoricalField::StreamingTv,
        CategoricalField::StreamingMovies,
    ];

    /// Fields one-hot encoded by the preprocessing transform, in column order.
    /// The per-service flags are folded into counts and never encoded directly.
    pub const ENCODED: [CategoricalField; 6] = [
        CategoricalField::ContractType,
        CategoricalField::PaperlessBilling,
        CategoricalField::PaymentMethod,
        CategoricalField::Partner,
        CategoricalField::Dependents,
        CategoricalField::MultipleLines,
    ];

    /// Canonical snake_case field name (wire key and column name).
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::ContractType => "type",
            CategoricalField::PaymentMethod => "payment_method",
            CategoricalField::PaperlessBilling => "paperless_billing",
            CategoricalField::Partner => "partner",
            CategoricalField::Dependents => "dependents",
            CategoricalField::MultipleLines => "multiple_lines",
            CategoricalField::OnlineSecurity => "online_security",
            CategoricalField::OnlineBackup => "online_backup",
            CategoricalField::DeviceProtection => "device_protection",
            CategoricalField::TechSupport => "tech_support",
            CategoricalField::StreamingTv => "streaming_tv",
            CategoricalField::StreamingMovies => "streaming_movies",
        }
    }

    pub fn domain(self) -> Vec<&'static str> {
        match self {
            CategoricalField::ContractType => literals::<ContractType>(),
            CategoricalField::PaymentMethod => literals::<PaymentMethod>(),
            CategoricalField::PaperlessBilling
            | CategoricalField::Partner
            | CategoricalField::Dependents => literals::<BinaryFlag>(),
            CategoricalField::MultipleLines
            | CategoricalField::OnlineSecurity
            | CategoricalField::OnlineBackup
            | CategoricalField::DeviceProtection
            | CategoricalField::TechSupport
            | CategoricalField::StreamingTv
            | CategoricalField::StreamingMovies => literals::<ServiceFlag>(),
        }
    }

    /// Whether a gap in an outer-merged training row may be filled with "Not connected".
    pub fn accepts_not_connected(self) -> bool {
        self.domain().contains(&ServiceFlag::NotConnected.literal())
    }

    pub fn describe_domain(self) -> String {
        let quoted: Vec<String> = self.domain().iter().map(|v| format!("'{}'", v)).collect();
        format!("[{}]", quoted.join(", "))
    }
}

fn literals<T: Categorical>() -> Vec<&'static str> {
    T::ALL.iter().map(|v| v.literal()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_roundtrip_through_registry() {
        for c in ContractType::ALL {
            assert_eq!(ContractType::from_literal(c.literal()), Some(*c));
        }
        assert_eq!(PaymentMethod::from_literal("Bank transfer (automatic)"), Some(PaymentMethod::BankTransfer));
        assert_eq!(ServiceFlag::from_literal("Not connected"), Some(ServiceFlag::NotConnected));
    }

    #[test]
    fn literal_matching_is_exact() {
        assert_eq!(BinaryFlag::from_literal("yes"), None);
        assert_eq!(ContractType::from_literal("Month-to-month "), None);
        assert_eq!(BinaryFlag::from_literal("Not connected"), None);
    }

    #[test]
    fn binary_fields_have_no_not_connected() {
        assert!(!CategoricalField::Partner.accepts_not_connected());
        assert!(!CategoricalField::PaperlessBilling.accepts_not_connected());
        assert!(CategoricalField::MultipleLines.accepts_not_connected());
        assert!(CategoricalField::StreamingTv.accepts_not_connected());
    }

    #[test]
    fn only_active_counts() {
        assert!(ServiceFlag::Yes.is_active());
        assert!(!ServiceFlag::No.is_active());
        assert!(!ServiceFlag::NotConnected.is_active());
    }
}
