/// Ordered inline style declarations, as in a `style="..."` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    items: Vec<(String, String)>,
}

impl Declarations {
    /// Parse `prop: value; prop: value`. Malformed pieces are dropped, the
    /// way browsers ignore invalid declarations.
    pub fn parse(attr: &str) -> Self {
        let items = attr
            .split(';')
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let (prop, value) = (prop.trim(), value.trim());
                if prop.is_empty() || value.is_empty() {
                    return None;
                }
                Some((prop.to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        Self { items }
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    /// Set in place if present, append otherwise.
    pub fn set(&mut self, prop: &str, value: impl Into<String>) {
        let value = value.into();
        match self.items.iter_mut().find(|(p, _)| p == prop) {
            Some(slot) => slot.1 = value,
            None => self.items.push((prop.to_string(), value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn serialize(&self) -> String {
        self.items
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_serialize() {
        let mut decls = Declarations::parse("color: red;  Margin : 4px ; bogus;");
        assert_eq!(decls.get("color"), Some("red"));
        assert_eq!(decls.get("margin"), Some("4px"));
        decls.set("color", "blue");
        decls.set("position", "fixed");
        assert_eq!(decls.serialize(), "color: blue; margin: 4px; position: fixed;");
    }

    #[test]
    fn empty_attribute() {
        assert!(Declarations::parse("").is_empty());
        assert!(Declarations::parse(" ; ;").is_empty());
    }
}
