use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Member lifecycle status. Members are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Deactivated,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team member view-model, built from a `profiles` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    /// Role label shown under the name
    pub title: String,
    /// Avatar URL, empty when unset
    pub avatar: String,
    pub email: Option<String>,
    /// Team name, `None` when unassigned
    pub team: Option<String>,
    pub team_id: Option<String>,
    pub role: Option<String>,
    pub is_admin: bool,
    pub status: MemberStatus,
    pub order_index: i64,
}

impl TeamMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Initials for the avatar fallback ("Sarah Chen" -> "SC")
    pub fn initials(&self) -> String {
        initials(&self.name, self.email.as_deref())
    }
}

/// Avatar fallback: initials of the name, else the first letter of the email, else `U`
pub fn initials(name: &str, email: Option<&str>) -> String {
    let from_name: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if !from_name.is_empty() {
        return from_name;
    }
    email
        .and_then(|e| e.chars().next())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "U".to_string())
}

/// Theme preference stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Sidebar toggle order: light -> dark -> system -> light
    pub fn cycle(self) -> ThemePreference {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::System,
            ThemePreference::System => ThemePreference::Light,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            _ => Err(format!("invalid theme: {} (expected light, dark or system)", s)),
        }
    }
}

/// The signed-in member plus their UI preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub member: TeamMember,
    pub theme_preference: ThemePreference,
    pub sidebar_expanded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_fallback_chain() {
        assert_eq!(initials("Sarah Chen", None), "SC");
        assert_eq!(initials("", Some("mike@example.com")), "M");
        assert_eq!(initials("   ", None), "U");
    }

    #[test]
    fn theme_cycle_visits_all_three() {
        let start = ThemePreference::Light;
        assert_eq!(start.cycle(), ThemePreference::Dark);
        assert_eq!(start.cycle().cycle(), ThemePreference::System);
        assert_eq!(start.cycle().cycle().cycle(), start);
    }

    #[test]
    fn status_wire_values() {
        assert_eq!(
            serde_json::to_string(&MemberStatus::Deactivated).unwrap(),
            "\"deactivated\""
        );
        assert_eq!("dark".parse::<ThemePreference>().unwrap(), ThemePreference::Dark);
    }
}
