use serde::{Deserialize, Serialize};

/// A named age bracket, e.g. `{ "name": "Young Adult", "min": 18, "max": 25 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub name: String,
    pub min: i64,
    pub max: i64,
}

/// A protagonist's "theory of control": a short title plus the belief it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theory {
    pub title: String,
    pub statement: String,
}

impl Theory {
    /// Display form: `Title: "statement"`.
    pub fn display(&self) -> String {
        format!("{}: \"{}\"", self.title, self.statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theory_display_quotes_statement() {
        let t = Theory {
            title: "Fatalist".to_string(),
            statement: "Nothing I do matters".to_string(),
        };
        assert_eq!(t.display(), "Fatalist: \"Nothing I do matters\"");
    }

    #[test]
    fn age_range_from_json() {
        let r: AgeRange =
            serde_json::from_str(r#"{"name":"Elder","min":60,"max":90}"#).unwrap();
        assert_eq!(r.name, "Elder");
        assert_eq!((r.min, r.max), (60, 90));
    }
}
