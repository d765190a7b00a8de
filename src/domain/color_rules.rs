// Conditional color rules - threshold-to-color mapping for widget values
use serde::{Deserialize, Serialize};

/// Which number a rule reads: the widget's current value or its trend
/// percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleField {
    Value,
    ChangePercent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Between,
}

/// One user-authored threshold rule. Rules live in an ordered list on the
/// widget; evaluation is first-match-wins, so array order is visible
/// behavior when ranges overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRule {
    pub id: String,
    pub field: RuleField,
    #[serde(rename = "operator")]
    pub op: RuleOp,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
    pub color: String,
    pub bg_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ColorRule {
    fn matches(&self, comparand: f64) -> bool {
        match self.op {
            RuleOp::Gt => comparand > self.value,
            RuleOp::Gte => comparand >= self.value,
            RuleOp::Lt => comparand < self.value,
            RuleOp::Lte => comparand <= self.value,
            RuleOp::Eq => comparand == self.value,
            RuleOp::Between => match self.value2 {
                // Inclusive on both ends; a between rule without an upper
                // bound is invalid and never matches.
                Some(value2) => comparand >= self.value && comparand <= value2,
                None => false,
            },
        }
    }
}

/// Evaluate rules in array order and return the first match, or None when
/// no rule applies (the renderer then uses its default styling).
///
/// A rule targeting the trend percentage is skipped outright when no
/// trend is available - it neither matches nor errors.
pub fn evaluate<'a>(
    value: f64,
    change_percent: Option<f64>,
    rules: &'a [ColorRule],
) -> Option<&'a ColorRule> {
    if rules.is_empty() || !value.is_finite() {
        return None;
    }

    rules.iter().find(|rule| {
        let comparand = match rule.field {
            RuleField::Value => value,
            RuleField::ChangePercent => match change_percent {
                Some(pct) => pct,
                None => return false,
            },
        };
        rule.matches(comparand)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, field: RuleField, op: RuleOp, value: f64, value2: Option<f64>) -> ColorRule {
        ColorRule {
            id: id.to_string(),
            field,
            op,
            value,
            value2,
            color: format!("#{id}"),
            bg_color: format!("#bg-{id}"),
            label: Some(id.to_string()),
        }
    }

    #[test]
    fn first_match_with_gap() {
        let rules = vec![
            rule("good", RuleField::Value, RuleOp::Gte, 70.0, None),
            rule("bad", RuleField::Value, RuleOp::Lt, 50.0, None),
        ];

        assert_eq!(evaluate(80.0, None, &rules).unwrap().id, "good");
        assert_eq!(evaluate(40.0, None, &rules).unwrap().id, "bad");
        // 60 sits in the gap between the two thresholds
        assert!(evaluate(60.0, None, &rules).is_none());
    }

    #[test]
    fn between_is_inclusive() {
        let rules = vec![rule("mid", RuleField::Value, RuleOp::Between, 10.0, Some(20.0))];

        assert!(evaluate(15.0, None, &rules).is_some());
        assert!(evaluate(10.0, None, &rules).is_some());
        assert!(evaluate(20.0, None, &rules).is_some());
        assert!(evaluate(25.0, None, &rules).is_none());
        assert!(evaluate(5.0, None, &rules).is_none());
    }

    #[test]
    fn between_without_upper_bound_is_skipped() {
        let rules = vec![
            rule("broken", RuleField::Value, RuleOp::Between, 10.0, None),
            rule("fallback", RuleField::Value, RuleOp::Gte, 0.0, None),
        ];
        assert_eq!(evaluate(15.0, None, &rules).unwrap().id, "fallback");
    }

    #[test]
    fn array_order_breaks_overlap_ties() {
        let danger = rule("danger", RuleField::Value, RuleOp::Gte, 30.0, None);
        let warn = rule("warn", RuleField::Value, RuleOp::Gte, 50.0, None);

        // 60 matches both rules; whichever comes first in the list wins.
        let danger_first = vec![danger.clone(), warn.clone()];
        let warn_first = vec![warn, danger];

        assert_eq!(evaluate(60.0, None, &danger_first).unwrap().id, "danger");
        assert_eq!(evaluate(60.0, None, &warn_first).unwrap().id, "warn");
    }

    #[test]
    fn change_percent_rule_skipped_without_trend() {
        let rules = vec![
            rule("trend", RuleField::ChangePercent, RuleOp::Gt, 0.0, None),
            rule("value", RuleField::Value, RuleOp::Gte, 0.0, None),
        ];

        assert_eq!(evaluate(10.0, None, &rules).unwrap().id, "value");
        assert_eq!(evaluate(10.0, Some(5.0), &rules).unwrap().id, "trend");
    }

    #[test]
    fn non_finite_value_returns_none() {
        let rules = vec![rule("any", RuleField::Value, RuleOp::Gte, 0.0, None)];
        assert!(evaluate(f64::NAN, None, &rules).is_none());
        assert!(evaluate(f64::INFINITY, None, &rules).is_none());
    }

    #[test]
    fn empty_rules_return_none() {
        assert!(evaluate(10.0, Some(1.0), &[]).is_none());
    }

    #[test]
    fn rule_wire_format() {
        let json = r##"{
            "id": "r1",
            "field": "changePercent",
            "operator": "between",
            "value": -5,
            "value2": 5,
            "color": "#888",
            "bgColor": "#eee",
            "label": "flat"
        }"##;
        let parsed: ColorRule = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.field, RuleField::ChangePercent);
        assert_eq!(parsed.op, RuleOp::Between);
        assert_eq!(parsed.value2, Some(5.0));

        let round: ColorRule =
            serde_json::from_str(&serde_json::to_string(&parsed).unwrap()).unwrap();
        assert_eq!(round, parsed);
    }
}
