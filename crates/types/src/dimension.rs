//! Page geometry: sizes, orientation, margins, and the derived content box.
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionError {
    #[error(
        "page configuration leaves no content area ({content_width:.2} x {content_height:.2} pt)"
    )]
    EmptyContentArea {
        content_width: f32,
        content_height: f32,
    },
    #[error("margins must be non-negative")]
    NegativeMargin,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn is_non_negative(&self) -> bool {
        self.top >= 0.0 && self.right >= 0.0 && self.bottom >= 0.0 && self.left >= 0.0
    }

    /// Parse a CSS-style length value with optional unit (e.g., "10pt", "5mm", "12")
    fn parse_length(input: &str) -> Result<f32, String> {
        let input = input.trim();

        if let Some(val) = input.strip_suffix("pt") {
            return val
                .trim()
                .parse::<f32>()
                .map_err(|e| format!("Invalid number: {}", e));
        }
        if let Some(val) = input.strip_suffix("px") {
            return val
                .trim()
                .parse::<f32>()
                .map(|v| v * 72.0 / 96.0)
                .map_err(|e| format!("Invalid number: {}", e));
        }
        if let Some(val) = input.strip_suffix("in") {
            return val
                .trim()
                .parse::<f32>()
                .map(|v| v * 72.0)
                .map_err(|e| format!("Invalid number: {}", e));
        }
        if let Some(val) = input.strip_suffix("cm") {
            return val
                .trim()
                .parse::<f32>()
                .map(|v| v * 28.35)
                .map_err(|e| format!("Invalid number: {}", e));
        }
        if let Some(val) = input.strip_suffix("mm") {
            return val
                .trim()
                .parse::<f32>()
                .map(|v| v * 2.835)
                .map_err(|e| format!("Invalid number: {}", e));
        }

        // No unit, assume points
        input
            .parse::<f32>()
            .map_err(|e| format!("Invalid number: {}", e))
    }

    /// Parse CSS-style margin shorthand (1, 2, or 4 values)
    fn parse_shorthand(input: &str) -> Result<Self, String> {
        let mut values = Vec::new();
        for part in input.split_whitespace() {
            values.push(Self::parse_length(part)?);
        }

        match values.len() {
            1 => Ok(Margins::all(values[0])),
            2 => Ok(Margins {
                top: values[0],
                right: values[1],
                bottom: values[0],
                left: values[1],
            }),
            4 => Ok(Margins {
                top: values[0],
                right: values[1],
                bottom: values[2],
                left: values[3],
            }),
            _ => Err(format!(
                "Invalid margin shorthand: expected 1, 2, or 4 values, got {}",
                values.len()
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Margins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MarginsVisitor;
        impl<'de> de::Visitor<'de> for MarginsVisitor {
            type Value = Margins;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string like '72pt' or '10pt 20pt' or a map")
            }

            fn visit_str<E>(self, value: &str) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Margins::parse_shorthand(value).map_err(E::custom)
            }

            fn visit_f64<E>(self, value: f64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Ok(Margins::all(value as f32))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Margins, E>
            where
                E: de::Error,
            {
                Ok(Margins::all(value as f32))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Margins, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut margins = Margins::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "top" => margins.top = map.next_value()?,
                        "right" => margins.right = map.next_value()?,
                        "bottom" => margins.bottom = map.next_value()?,
                        "left" => margins.left = map.next_value()?,
                        _ => { /* ignore unknown fields */ }
                    }
                }
                Ok(margins)
            }
        }
        deserializer.deserialize_any(MarginsVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    A3,
    A5,
}

impl PageSize {
    /// Portrait dimensions in points (1 pt = 1/72 in).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "a3" => Ok(PageSize::A3),
            "a5" => Ok(PageSize::A5),
            _ => Err(format!("Unknown page size: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
            PageSize::A3 => "a3",
            PageSize::A5 => "a5",
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// The derived page box used by measurement and packing.
///
/// `content_width`/`content_height` are what remains after margins and the
/// header/footer bands; both must be strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub content_width: f32,
    pub content_height: f32,
    pub margins: Margins,
    pub header_height: f32,
    pub footer_height: f32,
}

impl PageDimensions {
    pub fn compute(
        page_size: PageSize,
        orientation: Orientation,
        margins: &Margins,
        header_height: f32,
        footer_height: f32,
    ) -> Result<Self, DimensionError> {
        if !margins.is_non_negative() {
            return Err(DimensionError::NegativeMargin);
        }
        let (mut width, mut height) = page_size.dimensions_pt();
        if orientation == Orientation::Landscape {
            std::mem::swap(&mut width, &mut height);
        }
        let content_width = width - margins.left - margins.right;
        let content_height =
            height - margins.top - margins.bottom - header_height - footer_height;
        if content_width <= 0.0 || content_height <= 0.0 {
            return Err(DimensionError::EmptyContentArea {
                content_width,
                content_height,
            });
        }
        Ok(Self {
            width,
            height,
            content_width,
            content_height,
            margins: margins.clone(),
            header_height,
            footer_height,
        })
    }
}
