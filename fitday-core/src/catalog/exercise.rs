use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::coerce_text;

/// One exercise from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawExercise")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub body_part: String,
    pub target: String,
    pub equipment: String,
    pub image_url: Option<String>,
}

impl Exercise {
    /// The name with its first letter capitalized.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Catalog payload as served; image fields vary between catalog versions.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    #[serde(default, alias = "_id")]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "body_part")]
    body_part: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    gif_url: Option<String>,
    #[serde(default)]
    gif: Option<String>,
    #[serde(default, alias = "image_url")]
    image: Option<String>,
    #[serde(default)]
    images: Option<RawImages>,
}

#[derive(Deserialize)]
struct RawImages {
    #[serde(default)]
    gif: Option<String>,
    #[serde(default)]
    small: Option<String>,
    #[serde(default)]
    medium: Option<String>,
}

impl From<RawExercise> for Exercise {
    fn from(raw: RawExercise) -> Self {
        let nested = raw
            .images
            .map(|images| [images.gif, images.small, images.medium])
            .unwrap_or_default();
        let image_url = [raw.gif_url, raw.gif, raw.image]
            .into_iter()
            .chain(nested)
            .flatten()
            .find(|url| !url.is_empty());

        Self {
            id: coerce_text(raw.id),
            name: raw.name.unwrap_or_default(),
            body_part: raw.body_part.unwrap_or_default(),
            target: raw.target.unwrap_or_default(),
            equipment: raw.equipment.unwrap_or_default(),
            image_url,
        }
    }
}
