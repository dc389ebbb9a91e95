use std::fmt;
use std::str::FromStr;

use jeka_util::errors::JekaError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of a published module: `group:name`.
///
/// Two module ids are equal iff both group and name are equal. Ordering is
/// lexicographic on group, then name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    group: String,
    name: String,
}

impl ModuleId {
    /// Build a module id from its two parts. Both must be non-empty and free of `:`.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Result<Self, JekaError> {
        let group = group.into();
        let name = name.into();
        for (part, value) in [("group", &group), ("name", &name)] {
            if value.is_empty() || value.contains(':') || value.chars().any(char::is_whitespace) {
                return Err(JekaError::Config {
                    message: format!("invalid module {part} '{value}'"),
                });
            }
        }
        Ok(Self { group, name })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory path of this module in a Maven layout: `org/slf4j/slf4j-api`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.group.replace('.', "/"), self.name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

impl FromStr for ModuleId {
    type Err = JekaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((group, name)) => ModuleId::new(group, name),
            None => Err(JekaError::Config {
                message: format!("module id '{s}' must be written group:name"),
            }),
        }
    }
}

impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let id: ModuleId = "org.springframework:spring-core".parse().unwrap();
        assert_eq!(id.group(), "org.springframework");
        assert_eq!(id.name(), "spring-core");
        assert_eq!(id.to_string(), "org.springframework:spring-core");
        assert_eq!(id.path(), "org/springframework/spring-core");
    }

    #[test]
    fn rejects_malformed() {
        assert!("no-colon".parse::<ModuleId>().is_err());
        assert!(":name".parse::<ModuleId>().is_err());
        assert!("group:".parse::<ModuleId>().is_err());
        assert!("a:b:c".parse::<ModuleId>().is_err());
    }

    #[test]
    fn ordering_is_group_then_name() {
        let a = ModuleId::new("a", "z").unwrap();
        let b = ModuleId::new("b", "a").unwrap();
        assert!(a < b);
    }
}
