use fp_models::EntityKind;
use strum::IntoEnumIterator;
use xot::{NameId, Xot};

/// Element and attribute names of the XML format, registered once per tree.
pub(crate) struct XmlNames {
    // elements
    pub floor_plan_mapping: NameId,
    pub background: NameId,
    pub entities: NameId,
    pub beacon: NameId,
    pub venue: NameId,
    pub measurement: NameId,
    pub path: NameId,
    pub polygon: NameId,
    pub marker: NameId,
    pub point: NameId,
    // attributes
    pub version: NameId,
    pub id: NameId,
    pub x: NameId,
    pub y: NameId,
    pub x1: NameId,
    pub y1: NameId,
    pub x2: NameId,
    pub y2: NameId,
    pub name: NameId,
    pub ssid: NameId,
    pub tx_power: NameId,
    pub category: NameId,
    pub label: NameId,
    pub color: NameId,
    pub kind: NameId,
    pub source: NameId,
    pub width: NameId,
    pub height: NameId,
}

impl XmlNames {
    pub fn register_with_xot(tree: &mut Xot) -> Self {
        Self {
            floor_plan_mapping: tree.add_name("FloorPlanMapping"),
            background: tree.add_name("Background"),
            entities: tree.add_name("Entities"),
            beacon: tree.add_name("Beacon"),
            venue: tree.add_name("Venue"),
            measurement: tree.add_name("Measurement"),
            path: tree.add_name("Path"),
            polygon: tree.add_name("Polygon"),
            marker: tree.add_name("Marker"),
            point: tree.add_name("Point"),
            version: tree.add_name("version"),
            id: tree.add_name("id"),
            x: tree.add_name("x"),
            y: tree.add_name("y"),
            x1: tree.add_name("x1"),
            y1: tree.add_name("y1"),
            x2: tree.add_name("x2"),
            y2: tree.add_name("y2"),
            name: tree.add_name("name"),
            ssid: tree.add_name("ssid"),
            tx_power: tree.add_name("txPower"),
            category: tree.add_name("category"),
            label: tree.add_name("label"),
            color: tree.add_name("color"),
            kind: tree.add_name("kind"),
            source: tree.add_name("source"),
            width: tree.add_name("width"),
            height: tree.add_name("height"),
        }
    }

    pub fn element_of(&self, kind: EntityKind) -> NameId {
        match kind {
            EntityKind::Beacon => self.beacon,
            EntityKind::Venue => self.venue,
            EntityKind::Measurement => self.measurement,
            EntityKind::Path => self.path,
            EntityKind::Polygon => self.polygon,
            EntityKind::Marker => self.marker,
        }
    }

    pub fn kind_of(&self, element: NameId) -> Option<EntityKind> {
        EntityKind::iter().find(|kind| self.element_of(*kind) == element)
    }
}
