use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(UserId);
id_newtype!(ProjectId);
id_newtype!(UpdateId);

// Payment method ids are opaque server-issued strings, not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Amex,
    Diners,
    Discover,
    Jcb,
    Mastercard,
    Visa,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: CardId,
    pub card_type: CardType,
    pub last_four: String,
    pub expiration_date: NaiveDate,
}

impl CreditCard {
    /// Expiration the way the settings screen renders it, `MM/YYYY`.
    pub fn expiration_label(&self) -> String {
        format!(
            "{:02}/{}",
            self.expiration_date.month(),
            self.expiration_date.year()
        )
    }
}

/// The slice of a project the comments empty state derives from.
///
/// `is_backing` is `None` exactly when no session identity was resolved
/// against the project at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub creator_id: UserId,
    pub is_backing: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub update_id: UpdateId,
    pub sequence: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_card_maps_the_api_payload() {
        let card: CreditCard = serde_json::from_str(
            r#"{"id":"69","card_type":"visa","last_four":"4242","expiration_date":"2027-03-01"}"#,
        )
        .expect("payload should deserialize");
        assert_eq!(card.id, CardId("69".into()));
        assert_eq!(card.card_type, CardType::Visa);
        assert_eq!(card.last_four, "4242");
    }

    #[test]
    fn expiration_label_is_month_slash_year() {
        let card = CreditCard {
            id: CardId("1".into()),
            card_type: CardType::Mastercard,
            last_four: "1111".into(),
            expiration_date: NaiveDate::from_ymd_opt(2027, 3, 1).expect("valid date"),
        };
        assert_eq!(card.expiration_label(), "03/2027");
    }
}
