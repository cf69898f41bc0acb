//! Service level agreement date [`Strategy`] definitions.
//!
//! A [`Strategy`] computes the due date of a ticket created out of a submitted
//! form.

use std::{collections::HashMap, time::Duration};

use common::DateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domain::question;

/// Strategy of computing a service level agreement date.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "strategy")]
pub enum Strategy {
    /// Date is taken as is from an answer to a date question.
    #[serde(rename = "advancedforms_specific_date_answer")]
    SpecificDateAnswer {
        /// ID of the date question.
        #[serde(default)]
        question_id: Option<question::Id>,
    },

    /// Date is an answer to a date question shifted by an [`Offset`].
    #[serde(rename = "advancedforms_computed_from_specific_date_answer")]
    ComputedFromSpecificDateAnswer {
        /// ID of the date question.
        #[serde(default)]
        question_id: Option<question::Id>,

        /// [`Offset`] to shift the answered date by.
        #[serde(flatten)]
        offset: Option<Offset>,
    },

    /// Date is the form submission date shifted by an [`Offset`].
    #[serde(rename = "advancedforms_computed_date_from_form_submit_date")]
    ComputedDateFromFormSubmitDate {
        /// [`Offset`] to shift the submission date by.
        #[serde(flatten)]
        offset: Option<Offset>,
    },
}

impl Strategy {
    /// Returns the key this [`Strategy`] is registered with.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::SpecificDateAnswer { .. } => {
                "advancedforms_specific_date_answer"
            }
            Self::ComputedFromSpecificDateAnswer { .. } => {
                "advancedforms_computed_from_specific_date_answer"
            }
            Self::ComputedDateFromFormSubmitDate { .. } => {
                "advancedforms_computed_date_from_form_submit_date"
            }
        }
    }

    /// Returns the weight ordering this [`Strategy`] among the others.
    #[must_use]
    pub const fn weight(&self) -> u8 {
        match self {
            Self::SpecificDateAnswer { .. } => 50,
            Self::ComputedDateFromFormSubmitDate { .. } => 60,
            Self::ComputedFromSpecificDateAnswer { .. } => 70,
        }
    }

    /// Computes the service level agreement date out of the provided
    /// [`AnswersSet`].
    ///
    /// [`None`] is returned if this [`Strategy`] is not fully configured or
    /// the required answer is missing, empty or not a date.
    #[must_use]
    pub fn compute(&self, answers: &AnswersSet) -> Option<String> {
        match self {
            Self::SpecificDateAnswer { question_id } => answers
                .get((*question_id)?)
                .map(ToOwned::to_owned),
            Self::ComputedFromSpecificDateAnswer {
                question_id,
                offset,
            } => {
                let date = DateTime::parse(answers.get((*question_id)?)?).ok()?;
                offset.as_ref()?.apply(date).map(|dt| dt.format())
            }
            Self::ComputedDateFromFormSubmitDate { offset } => offset
                .as_ref()?
                .apply(answers.submitted_at)
                .map(|dt| dt.format()),
        }
    }
}

/// Signed offset of a date.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Offset {
    /// Number of [`TimeDefinition`] units to shift by.
    ///
    /// Numeric strings are accepted too, truncated towards zero.
    #[serde(rename = "time_offset", deserialize_with = "amount::deserialize")]
    pub amount: i32,

    /// [`TimeDefinition`] of the `amount`.
    #[serde(rename = "time_definition")]
    pub definition: TimeDefinition,
}

impl Offset {
    /// Shifts the provided [`DateTime`] by this [`Offset`].
    ///
    /// [`None`] is returned if the result overflows.
    #[must_use]
    pub fn apply(&self, dt: DateTime) -> Option<DateTime> {
        let unit = match self.definition {
            TimeDefinition::Minute => 60,
            TimeDefinition::Hour => 60 * 60,
            TimeDefinition::Day => 60 * 60 * 24,
            TimeDefinition::Month => return dt.checked_add_months(self.amount),
        };
        let shift =
            Duration::from_secs(unit * u64::from(self.amount.unsigned_abs()));
        if self.amount < 0 {
            dt.checked_sub(shift)
        } else {
            dt.checked_add(shift)
        }
    }
}

/// Deserialization of an [`Offset::amount`] stored either as a number or as
/// a numeric string.
mod amount {
    use serde::{de::Error as _, Deserialize, Deserializer};

    /// Raw stored amount.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = match Raw::deserialize(deserializer)? {
            Raw::Int(i) => i32::try_from(i).ok(),
            Raw::Float(f) => truncate(f),
            Raw::Text(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
        };
        amount.ok_or_else(|| D::Error::custom("`time_offset` is not numeric"))
    }

    /// Truncates the provided `value` towards zero, if it fits into [`i32`].
    #[expect(clippy::cast_possible_truncation, reason = "range is checked")]
    fn truncate(value: f64) -> Option<i32> {
        let value = value.trunc();
        (value.is_finite()
            && value >= f64::from(i32::MIN)
            && value <= f64::from(i32::MAX))
        .then(|| value as i32)
    }
}

/// Unit of an [`Offset`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeDefinition {
    /// Minutes.
    Minute,

    /// Hours.
    Hour,

    /// Days.
    Day,

    /// Calendar months.
    Month,
}

/// Answers of a submitted form.
#[derive(Clone, Debug)]
pub struct AnswersSet {
    /// [`DateTime`] the form was submitted at.
    pub submitted_at: DateTime,

    /// Raw answers by their questions.
    pub answers: HashMap<question::Id, String>,
}

impl AnswersSet {
    /// Returns the non-empty raw answer to the provided question.
    #[must_use]
    pub fn get(&self, id: question::Id) -> Option<&str> {
        self.answers
            .get(&id)
            .map(String::as_str)
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use common::DateTime;
    use serde_json::json;

    use super::{AnswersSet, Offset, Strategy, TimeDefinition};

    fn answers() -> AnswersSet {
        AnswersSet {
            submitted_at: DateTime::parse("2025-01-31 09:15:00").unwrap(),
            answers: HashMap::from([
                (1.into(), "2025-06-10 14:00:00".to_owned()),
                (2.into(), String::new()),
                (3.into(), "not a date".to_owned()),
                (4.into(), "2025-06-10".to_owned()),
            ]),
        }
    }

    fn offset(amount: i32, definition: TimeDefinition) -> Option<Offset> {
        Some(Offset { amount, definition })
    }

    #[test]
    fn specific_date_answer() {
        let compute = |id: Option<u32>| {
            Strategy::SpecificDateAnswer {
                question_id: id.map(Into::into),
            }
            .compute(&answers())
        };

        assert_eq!(compute(Some(1)).as_deref(), Some("2025-06-10 14:00:00"));
        assert_eq!(compute(Some(3)).as_deref(), Some("not a date"));
        assert_eq!(compute(Some(2)), None);
        assert_eq!(compute(Some(42)), None);
        assert_eq!(compute(None), None);
    }

    #[test]
    fn computed_from_specific_date_answer() {
        let compute = |id: u32, offset| {
            Strategy::ComputedFromSpecificDateAnswer {
                question_id: Some(id.into()),
                offset,
            }
            .compute(&answers())
        };

        assert_eq!(
            compute(1, offset(2, TimeDefinition::Hour)).as_deref(),
            Some("2025-06-10 16:00:00"),
        );
        assert_eq!(
            compute(1, offset(-30, TimeDefinition::Minute)).as_deref(),
            Some("2025-06-10 13:30:00"),
        );
        assert_eq!(
            compute(4, offset(3, TimeDefinition::Day)).as_deref(),
            Some("2025-06-13 00:00:00"),
        );
        assert_eq!(
            compute(1, offset(-1, TimeDefinition::Month)).as_deref(),
            Some("2025-05-10 14:00:00"),
        );
        assert_eq!(compute(3, offset(1, TimeDefinition::Day)), None);
        assert_eq!(compute(2, offset(1, TimeDefinition::Day)), None);
        assert_eq!(compute(1, None), None);
        assert_eq!(
            compute(1, offset(31, TimeDefinition::Day)).as_deref(),
            Some("2025-07-11 14:00:00"),
        );
        assert_eq!(
            compute(1, offset(-90, TimeDefinition::Minute)).as_deref(),
            Some("2025-06-10 12:30:00"),
        );
    }

    #[test]
    fn computed_date_from_form_submit_date() {
        let compute = |offset| {
            Strategy::ComputedDateFromFormSubmitDate { offset }
                .compute(&answers())
        };

        assert_eq!(
            compute(offset(1, TimeDefinition::Month)).as_deref(),
            Some("2025-03-03 09:15:00"),
        );
        assert_eq!(
            compute(offset(-2, TimeDefinition::Day)).as_deref(),
            Some("2025-01-29 09:15:00"),
        );
        assert_eq!(
            compute(offset(0, TimeDefinition::Hour)).as_deref(),
            Some("2025-01-31 09:15:00"),
        );
        assert_eq!(compute(None), None);
    }

    #[test]
    fn deserializes_by_key() {
        let strategy: Strategy = serde_json::from_value(json!({
            "strategy": "advancedforms_computed_from_specific_date_answer",
            "question_id": 5,
            "time_offset": -3,
            "time_definition": "day",
        }))
        .unwrap();
        assert_eq!(
            strategy,
            Strategy::ComputedFromSpecificDateAnswer {
                question_id: Some(5.into()),
                offset: offset(-3, TimeDefinition::Day),
            },
        );
        assert_eq!(
            strategy.key(),
            "advancedforms_computed_from_specific_date_answer",
        );
        assert_eq!(strategy.weight(), 70);

        let strategy: Strategy = serde_json::from_value(json!({
            "strategy": "advancedforms_computed_date_from_form_submit_date",
        }))
        .unwrap();
        assert_eq!(
            strategy,
            Strategy::ComputedDateFromFormSubmitDate { offset: None },
        );
    }

    #[test]
    fn deserializes_numeric_string_amounts() {
        let amount = |raw: serde_json::Value| {
            serde_json::from_value::<Strategy>(json!({
                "strategy": "advancedforms_computed_date_from_form_submit_date",
                "time_offset": raw,
                "time_definition": "hour",
            }))
            .unwrap()
        };
        let expected = |amount| Strategy::ComputedDateFromFormSubmitDate {
            offset: offset(amount, TimeDefinition::Hour),
        };

        assert_eq!(amount(json!("5")), expected(5));
        assert_eq!(amount(json!(" -2 ")), expected(-2));
        assert_eq!(amount(json!("7.9")), expected(7));
        assert_eq!(amount(json!(2.5)), expected(2));
        assert_eq!(amount(json!(45)), expected(45));
        assert_eq!(
            amount(json!("5")).compute(&answers()).as_deref(),
            Some("2025-01-31 14:15:00"),
        );

        assert_eq!(
            amount(json!("five")),
            Strategy::ComputedDateFromFormSubmitDate { offset: None },
        );
        assert_eq!(
            amount(json!("")),
            Strategy::ComputedDateFromFormSubmitDate { offset: None },
        );
    }
}
