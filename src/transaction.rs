use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Transaction kind as reported by the wallet API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionType {
    Transfer,
    Recharge,
    Cashback,
    /// `null`, missing, or a kind this service does not know.
    #[default]
    Unspecified,
}

impl TransactionType {
    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            TransactionType::Transfer => Some("TRANSFER"),
            TransactionType::Recharge => Some("RECHARGE"),
            TransactionType::Cashback => Some("CASHBACK"),
            TransactionType::Unspecified => None,
        }
    }

    fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("TRANSFER") => TransactionType::Transfer,
            Some("RECHARGE") => TransactionType::Recharge,
            Some("CASHBACK") => TransactionType::Cashback,
            _ => TransactionType::Unspecified,
        }
    }
}

/// One entry of the wallet's transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "de_type",
        serialize_with = "ser_type"
    )]
    pub kind: TransactionType,
    #[serde(deserialize_with = "de_amount")]
    pub amount: f64,
    #[serde(deserialize_with = "de_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub sender_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub recipient_id: Option<String>,
}

impl TransactionRecord {
    /// Calendar date of the record, in UTC.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn category(&self) -> Category {
        classify(self.kind, self.sender_id.as_deref(), self.recipient_id.as_deref())
    }
}

/// Aggregation bucket. Every record lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Received,
    Transferred,
    Recharge,
    Cashback,
}

impl Category {
    /// Display order used by every chart.
    pub const ALL: [Category; 4] = [
        Category::Received,
        Category::Transferred,
        Category::Recharge,
        Category::Cashback,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Received => "Amount Received",
            Category::Transferred => "Amount Transferred",
            Category::Recharge => "Recharge",
            Category::Cashback => "Cashback",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Category::Received => 0,
            Category::Transferred => 1,
            Category::Recharge => 2,
            Category::Cashback => 3,
        }
    }
}

/// Maps a transaction onto its category.
///
/// A transfer carrying a sender id was received by this wallet; one carrying
/// only a recipient id was sent from it. Everything that is neither a
/// transfer with a counterparty nor a recharge counts as cashback.
pub fn classify(
    kind: TransactionType,
    sender_id: Option<&str>,
    recipient_id: Option<&str>,
) -> Category {
    match (kind, sender_id, recipient_id) {
        (TransactionType::Transfer, Some(_), _) => Category::Received,
        (TransactionType::Transfer, None, Some(_)) => Category::Transferred,
        (TransactionType::Recharge, _, _) => Category::Recharge,
        _ => Category::Cashback,
    }
}

fn de_type<'de, D>(deserializer: D) -> Result<TransactionType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(TransactionType::from_wire(raw.as_deref()))
}

fn ser_type<S>(kind: &TransactionType, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    kind.as_wire().serialize(serializer)
}

/// Ids arrive as strings or numbers. Empty strings count as absent.
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawId::Text(s)) if s.trim().is_empty() => None,
        Some(RawId::Text(s)) => Some(s),
        Some(RawId::Int(n)) => Some(n.to_string()),
        Some(RawId::Uint(n)) => Some(n.to_string()),
        None => None,
    })
}

/// Amounts are magnitudes; direction comes from the category.
fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = f64::deserialize(deserializer)?;
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(serde::de::Error::custom(format!("invalid amount {}", amount)))
    }
}

/// Timestamps arrive as ISO strings or as epoch milliseconds.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
        Fractional(f64),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(raw) => parse_timestamp(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognised timestamp {:?}", raw))
        }),
        RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms).ok_or_else(|| {
            serde::de::Error::custom(format!("timestamp {} ms out of range", ms))
        }),
        RawTimestamp::Fractional(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(ms.trunc() as i64).ok_or_else(|| {
                serde::de::Error::custom(format!("timestamp {} ms out of range", ms))
            })
        }
        RawTimestamp::Fractional(ms) => {
            Err(serde::de::Error::custom(format!("invalid timestamp {}", ms)))
        }
    }
}

/// Accepts RFC 3339, naive ISO date-times (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
