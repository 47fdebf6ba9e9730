use std::fmt;
use std::str::FromStr;

/// Muscle groups the exercise catalog can be searched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Back,
    Cardio,
    Chest,
    LowerArms,
    LowerLegs,
    Neck,
    Shoulders,
    UpperArms,
    UpperLegs,
    Waist,
}

impl BodyPart {
    pub const ALL: [BodyPart; 10] = [
        BodyPart::Back,
        BodyPart::Cardio,
        BodyPart::Chest,
        BodyPart::LowerArms,
        BodyPart::LowerLegs,
        BodyPart::Neck,
        BodyPart::Shoulders,
        BodyPart::UpperArms,
        BodyPart::UpperLegs,
        BodyPart::Waist,
    ];

    /// Name as the catalog spells it.
    pub fn api_name(&self) -> &'static str {
        match self {
            BodyPart::Back => "back",
            BodyPart::Cardio => "cardio",
            BodyPart::Chest => "chest",
            BodyPart::LowerArms => "lower arms",
            BodyPart::LowerLegs => "lower legs",
            BodyPart::Neck => "neck",
            BodyPart::Shoulders => "shoulders",
            BodyPart::UpperArms => "upper arms",
            BodyPart::UpperLegs => "upper legs",
            BodyPart::Waist => "waist",
        }
    }

    /// URL path segment, e.g. `lower%20arms`.
    pub fn path_segment(&self) -> String {
        urlencoding::encode(self.api_name()).into_owned()
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for BodyPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        BodyPart::ALL
            .into_iter()
            .find(|part| part.api_name() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = BodyPart::ALL.iter().map(|p| p.api_name()).collect();
                format!(
                    "Invalid body part '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}
