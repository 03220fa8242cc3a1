use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Error body returned by the API on failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A label that does not name any variant of a closed set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

/// Read an optional label, mapping blank or unrecognised values to `None`
/// so one odd record never rejects the whole envelope.
fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|label| label.trim().parse().ok()))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cad,
}

impl FromStr for Currency {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "CAD" => Ok(Self::Cad),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

pub mod group {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Group {
        pub id: i64,
        pub creator: i64,
        pub name: String,
        /// ISO 8601 timestamp, kept raw; see `engine::dates`.
        pub created_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        #[serde(default)]
        pub groups: Vec<Group>,
    }
}

pub mod receipt {
    use super::*;

    /// Spending category of a receipt line item.
    ///
    /// Line items carry the capitalised label (`"Food"`, `"Health"`, ...);
    /// [`Category::as_str`] returns exactly that label.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Category {
        Home,
        Food,
        Clothing,
        Utilities,
        Entertainment,
        Fixtures,
        Furniture,
        Health,
        Beauty,
        Electronics,
    }

    impl Category {
        pub const ALL: [Category; 10] = [
            Self::Home,
            Self::Food,
            Self::Clothing,
            Self::Utilities,
            Self::Entertainment,
            Self::Fixtures,
            Self::Furniture,
            Self::Health,
            Self::Beauty,
            Self::Electronics,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Home => "Home",
                Self::Food => "Food",
                Self::Clothing => "Clothing",
                Self::Utilities => "Utilities",
                Self::Entertainment => "Entertainment",
                Self::Fixtures => "Fixtures",
                Self::Furniture => "Furniture",
                Self::Health => "Health",
                Self::Beauty => "Beauty",
                Self::Electronics => "Electronics",
            }
        }
    }

    impl fmt::Display for Category {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for Category {
        type Err = UnknownLabel;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|category| category.as_str() == s)
                .ok_or_else(|| UnknownLabel(s.to_string()))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum PaymentMethod {
        Debit,
        Credit,
        Cash,
    }

    impl FromStr for PaymentMethod {
        type Err = UnknownLabel;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "debit" => Ok(Self::Debit),
                "credit" => Ok(Self::Credit),
                "cash" => Ok(Self::Cash),
                _ => Err(UnknownLabel(s.to_string())),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ReceiptItem {
        pub id: Option<i64>,
        pub name: String,
        /// Category label, compared verbatim against [`Category::as_str`].
        #[serde(default)]
        pub category: Option<String>,
        pub price: f64,
        pub quantity: i64,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Receipt {
        pub id: i64,
        #[serde(default)]
        pub merchant: Option<String>,
        /// Purchase date (`YYYY-MM-DD` or a full timestamp), kept raw.
        pub date: String,
        #[serde(default, deserialize_with = "lenient_label")]
        pub currency: Option<Currency>,
        #[serde(default, deserialize_with = "lenient_label")]
        pub payment_method: Option<PaymentMethod>,
        #[serde(default)]
        pub items: Vec<ReceiptItem>,
        pub total_amount: f64,
        pub tax: Option<f64>,
        pub tip: Option<f64>,
        pub tax_rate: Option<f64>,
        pub tip_rate: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptsResponse {
        #[serde(default)]
        pub receipts: Vec<Receipt>,
    }
}

pub mod subscription {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BillingPeriod {
        Weekly,
        Monthly,
        Quarterly,
        Yearly,
    }

    impl BillingPeriod {
        pub const ALL: [BillingPeriod; 4] =
            [Self::Weekly, Self::Monthly, Self::Quarterly, Self::Yearly];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Weekly => "Weekly",
                Self::Monthly => "Monthly",
                Self::Quarterly => "Quarterly",
                Self::Yearly => "Yearly",
            }
        }
    }

    impl fmt::Display for BillingPeriod {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for BillingPeriod {
        type Err = UnknownLabel;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|period| period.as_str() == s)
                .ok_or_else(|| UnknownLabel(s.to_string()))
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Subscription {
        pub id: i64,
        pub user_id: i64,
        pub merchant: String,
        pub total_amount: f64,
        #[serde(default, deserialize_with = "lenient_label")]
        pub currency: Option<Currency>,
        /// Billing period label, compared verbatim against [`BillingPeriod::as_str`].
        pub billing_period: String,
        /// Next renewal timestamp, kept raw.
        pub renewal_date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionsResponse {
        #[serde(default)]
        pub subscriptions: Vec<Subscription>,
    }
}

pub mod user {
    use super::*;

    /// Login body; `identifier` is either a username or an email.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub identifier: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisteredUser {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterResponse {
        #[serde(default)]
        pub message: String,
        pub user: RegisteredUser,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenPair {
        pub access: String,
        #[serde(default)]
        pub refresh: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct User {
        pub id: i64,
        pub username: String,
        pub email: String,
        #[serde(default)]
        pub first_name: String,
        #[serde(default)]
        pub last_name: String,
        pub phone_number: Option<String>,
    }
}
