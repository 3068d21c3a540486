use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A signed money amount held in cents.
///
/// On the wire it is a plain JSON number (`-20`, `12.5`), rounded to the
/// nearest cent when read. Negative amounts are expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Largest magnitude accepted from input, in major units.
    pub const MAX_MAJOR: f64 = 1_000_000_000_000.0;

    pub fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    /// Rounds to the nearest cent. `None` for non-finite values or
    /// magnitudes above [`MAX_MAJOR`](Self::MAX_MAJOR).
    pub fn try_from_major(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > Self::MAX_MAJOR {
            return None;
        }
        Some(Amount((value * 100.0).round() as i64))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_expense(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;
        Amount::try_from_major(value).ok_or_else(|| format!("'{s}' is out of range"))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::try_from_major(value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "amount {value} is out of range (limit {})",
                Amount::MAX_MAJOR
            ))
        })
    }
}

/// Transaction category. Known names map to variants, anything else is kept
/// verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    FoodAndDining,
    Shopping,
    Housing,
    Transportation,
    Entertainment,
    Healthcare,
    PersonalCare,
    Education,
    Travel,
    GiftsAndDonations,
    Investments,
    Income,
    Other,
    Custom(String),
}

impl Category {
    /// Names of the predefined categories, in display order.
    pub const KNOWN: [&'static str; 13] = [
        "Food & Dining",
        "Shopping",
        "Housing",
        "Transportation",
        "Entertainment",
        "Healthcare",
        "Personal Care",
        "Education",
        "Travel",
        "Gifts & Donations",
        "Investments",
        "Income",
        "Other",
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Housing => "Housing",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Healthcare => "Healthcare",
            Category::PersonalCare => "Personal Care",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::GiftsAndDonations => "Gifts & Donations",
            Category::Investments => "Investments",
            Category::Income => "Income",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "Food & Dining" => Category::FoodAndDining,
            "Shopping" => Category::Shopping,
            "Housing" => Category::Housing,
            "Transportation" => Category::Transportation,
            "Entertainment" => Category::Entertainment,
            "Healthcare" => Category::Healthcare,
            "Personal Care" => Category::PersonalCare,
            "Education" => Category::Education,
            "Travel" => Category::Travel,
            "Gifts & Donations" => Category::GiftsAndDonations,
            "Investments" => Category::Investments,
            "Income" => Category::Income,
            "Other" => Category::Other,
            custom => Category::Custom(custom.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a transaction was paid. Defaults to `Cash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    MobilePayment,
    Check,
    Other,
    Custom(String),
}

impl PaymentMethod {
    pub const KNOWN: [&'static str; 7] = [
        "Cash",
        "Credit Card",
        "Debit Card",
        "Bank Transfer",
        "Mobile Payment",
        "Check",
        "Other",
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::MobilePayment => "Mobile Payment",
            PaymentMethod::Check => "Check",
            PaymentMethod::Other => "Other",
            PaymentMethod::Custom(name) => name,
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value {
            "Cash" => PaymentMethod::Cash,
            "Credit Card" => PaymentMethod::CreditCard,
            "Debit Card" => PaymentMethod::DebitCard,
            "Bank Transfer" => PaymentMethod::BankTransfer,
            "Mobile Payment" => PaymentMethod::MobilePayment,
            "Check" => PaymentMethod::Check,
            "Other" => PaymentMethod::Other,
            custom => PaymentMethod::Custom(custom.to_string()),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        PaymentMethod::from(value.as_str())
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Custom(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// Absent and `null` both mean the default payment method.
fn payment_method_or_default<'de, D>(deserializer: D) -> Result<PaymentMethod, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PaymentMethod>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single financial transaction as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: Amount,
    pub category: Category,
    #[serde(
        rename = "paymentMethod",
        default,
        deserialize_with = "payment_method_or_default"
    )]
    pub payment_method: PaymentMethod,
}

impl FinancialRecord {
    pub fn from_draft(id: String, owner_id: String, draft: RecordDraft) -> Self {
        Self {
            id,
            owner_id,
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            category: draft.category,
            payment_method: draft.payment_method,
        }
    }

    /// Shallow merge: fields present in `patch` overwrite, the rest are kept.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(payment_method) = &patch.payment_method {
            self.payment_method = payment_method.clone();
        }
    }
}

/// Record payload before the server has assigned an id or owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: Amount,
    pub category: Category,
    #[serde(
        rename = "paymentMethod",
        default,
        deserialize_with = "payment_method_or_default"
    )]
    pub payment_method: PaymentMethod,
}

/// Body of a create request: a draft tagged with its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(flatten)]
    pub draft: RecordDraft,
}

/// Partial record used for updates and for reading update responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(
        rename = "paymentMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<PaymentMethod>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.payment_method.is_none()
    }

    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
