use std::str::FromStr;

use fp_core::Vec2;
use fp_models::{
    BackgroundImage, Beacon, EntityKind, MappingDocument, MappingEntity, Marker, MarkerKind,
    Measurement, NavPath, Polygon, Venue,
};
use tracing::{debug, info_span, trace};
use uuid::Uuid;
use xot::{Element, NameId, Node, Xot};

use super::names::XmlNames;
use crate::CodecError;

/// Reads a `<FloorPlanMapping>` tree back into a document.
///
/// Whitespace and comments are ignored. Unknown elements at the top level are
/// skipped, unknown elements inside `<Entities>` are an error.
pub(crate) fn mapping_from_xml(content: &str) -> Result<MappingDocument, CodecError> {
    let mut tree = Xot::new();
    let names = XmlNames::register_with_xot(&mut tree);
    let root_node = tree.parse(content).map_err(CodecError::xml)?;
    let mapping_node = tree.document_element(root_node).map_err(CodecError::xml)?;
    let mapping_element = tree
        .element(mapping_node)
        .ok_or_else(|| CodecError::schema("document element is not an element"))?;
    if mapping_element.name() != names.floor_plan_mapping {
        return Err(CodecError::schema("root tag is not FloorPlanMapping"));
    }
    let version: u32 = parse_attribute(mapping_element, names.version, "version")?;

    let mut document = MappingDocument {
        version,
        background: None,
        entities: Vec::new(),
    };
    for child in tree.children(mapping_node) {
        let Some(ele) = tree.element(child) else {
            continue;
        };
        if ele.name() == names.background {
            document.background = Some(parse_background(ele, &names)?);
        } else if ele.name() == names.entities {
            for entity_node in tree.children(child) {
                if let Some(entity) = parse_entity(&tree, &names, entity_node)? {
                    document.entities.push(entity);
                }
            }
        } else {
            debug!("ignoring unknown element under FloorPlanMapping");
        }
    }
    debug!(
        version = document.version,
        entities = document.entities.len(),
        "mapping parsed from xml"
    );
    Ok(document)
}

fn required<'a>(ele: &'a Element, name: NameId, label: &str) -> Result<&'a str, CodecError> {
    ele.get_attribute(name)
        .ok_or_else(|| CodecError::schema(format!("missing attribute `{label}`")))
}

fn parse_attribute<T: FromStr>(ele: &Element, name: NameId, label: &str) -> Result<T, CodecError> {
    let raw = required(ele, name, label)?;
    raw.trim()
        .parse()
        .map_err(|_| CodecError::schema(format!("invalid value `{raw}` for attribute `{label}`")))
}

fn parse_optional_attribute<T: FromStr>(
    ele: &Element,
    name: NameId,
    label: &str,
) -> Result<Option<T>, CodecError> {
    match ele.get_attribute(name) {
        None => Ok(None),
        Some(_) => parse_attribute(ele, name, label).map(Some),
    }
}

fn optional_string(ele: &Element, name: NameId) -> Option<String> {
    ele.get_attribute(name).map(str::to_string)
}

fn parse_position(ele: &Element, x: (NameId, &str), y: (NameId, &str)) -> Result<Vec2, CodecError> {
    Ok(Vec2::new(
        parse_attribute(ele, x.0, x.1)?,
        parse_attribute(ele, y.0, y.1)?,
    ))
}

fn parse_background(ele: &Element, names: &XmlNames) -> Result<BackgroundImage, CodecError> {
    Ok(BackgroundImage {
        source: required(ele, names.source, "source")?.to_string(),
        width: parse_optional_attribute(ele, names.width, "width")?,
        height: parse_optional_attribute(ele, names.height, "height")?,
    })
}

fn parse_points(tree: &Xot, names: &XmlNames, parent: Node) -> Result<Vec<Vec2>, CodecError> {
    let mut points = Vec::new();
    for child in tree.children(parent) {
        let Some(ele) = tree.element(child) else {
            continue;
        };
        if ele.name() != names.point {
            return Err(CodecError::schema("only <Point> elements may appear in a shape"));
        }
        points.push(parse_position(ele, (names.x, "x"), (names.y, "y"))?);
    }
    Ok(points)
}

fn parse_entity(
    tree: &Xot,
    names: &XmlNames,
    node: Node,
) -> Result<Option<MappingEntity>, CodecError> {
    let Some(ele) = tree.element(node) else {
        return Ok(None);
    };
    let kind = names
        .kind_of(ele.name())
        .ok_or_else(|| CodecError::schema("unexpected element inside <Entities>"))?;
    let raw_id = required(ele, names.id, "id")?;
    let id = Uuid::from_str(raw_id)
        .map_err(|_| CodecError::schema(format!("invalid entity id `{raw_id}`")))?;
    let _span = info_span!("entity", %kind, %id).entered();
    trace!("parsing entity");

    let entity = match kind {
        EntityKind::Beacon => MappingEntity::Beacon(Beacon {
            id,
            position: parse_position(ele, (names.x, "x"), (names.y, "y"))?,
            name: required(ele, names.name, "name")?.to_string(),
            ssid: optional_string(ele, names.ssid),
            tx_power: parse_optional_attribute(ele, names.tx_power, "txPower")?,
        }),
        EntityKind::Venue => MappingEntity::Venue(Venue {
            id,
            position: parse_position(ele, (names.x, "x"), (names.y, "y"))?,
            name: required(ele, names.name, "name")?.to_string(),
            category: optional_string(ele, names.category),
        }),
        EntityKind::Measurement => MappingEntity::Measurement(Measurement {
            id,
            start: parse_position(ele, (names.x1, "x1"), (names.y1, "y1"))?,
            end: parse_position(ele, (names.x2, "x2"), (names.y2, "y2"))?,
            label: optional_string(ele, names.label),
        }),
        EntityKind::Marker => MappingEntity::Marker(Marker {
            id,
            kind: parse_attribute::<MarkerKind>(ele, names.kind, "kind")?,
            position: parse_position(ele, (names.x, "x"), (names.y, "y"))?,
            label: optional_string(ele, names.label),
        }),
        EntityKind::Path => MappingEntity::Path(NavPath {
            id,
            name: optional_string(ele, names.name),
            points: parse_points(tree, names, node)?,
        }),
        EntityKind::Polygon => MappingEntity::Polygon(Polygon {
            id,
            name: optional_string(ele, names.name),
            color: optional_string(ele, names.color),
            points: parse_points(tree, names, node)?,
        }),
    };
    Ok(Some(entity))
}
