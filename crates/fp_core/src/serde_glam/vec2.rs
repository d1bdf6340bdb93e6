use serde::{
    de::{Error, SeqAccess, Visitor},
    Deserialize, Serialize,
};

/// A position on the floor plan, in image pixels.
///
/// Serialized as a two element sequence `[x, y]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2(pub glam::Vec2);

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self(glam::Vec2::new(x, y))
    }
    pub fn x(&self) -> f32 {
        self.0.x
    }
    pub fn y(&self) -> f32 {
        self.0.y
    }
    /// Both components are neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
    pub fn distance(&self, other: Vec2) -> f32 {
        self.0.distance(other.0)
    }
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self(self.0 + glam::Vec2::new(dx, dy))
    }
}

impl From<Vec2> for glam::Vec2 {
    fn from(src: Vec2) -> glam::Vec2 {
        src.0
    }
}
impl From<glam::Vec2> for Vec2 {
    fn from(src: glam::Vec2) -> Vec2 {
        Vec2(src)
    }
}
impl From<[f32; 2]> for Vec2 {
    fn from(src: [f32; 2]) -> Vec2 {
        Vec2(glam::Vec2::from_array(src))
    }
}

struct Vec2Deserializer;
impl<'de> Visitor<'de> for Vec2Deserializer {
    type Value = Vec2;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of two numbers [x, y]")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let x: f32 = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(0, &self))?;
        let y: f32 = seq
            .next_element()?
            .ok_or_else(|| A::Error::invalid_length(1, &self))?;
        if seq.next_element::<f32>()?.is_some() {
            return Err(A::Error::invalid_length(3, &self));
        }
        Ok(Vec2::new(x, y))
    }
}

impl Serialize for Vec2 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.0.x)?;
        seq.serialize_element(&self.0.y)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Vec2 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(Vec2Deserializer)
    }
}
