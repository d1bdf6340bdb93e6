use fp_core::Vec2;
use fp_models::{BackgroundImage, MappingDocument, MappingEntity};
use tracing::{debug, trace};
use xot::{Element, NameId, Node, SerializeOptions, Xot};

use super::names::XmlNames;
use crate::CodecError;

/// Writes the document as a pretty printed `<FloorPlanMapping>` tree.
pub(crate) fn mapping_to_xml(document: &MappingDocument) -> Result<String, CodecError> {
    let mut tree = Xot::new();
    let names = XmlNames::register_with_xot(&mut tree);
    let mapping_node = tree.new_element(names.floor_plan_mapping);
    let root_node = tree.new_root(mapping_node).map_err(CodecError::xml)?;
    element_mut(&mut tree, mapping_node)?
        .set_attribute(names.version, document.version.to_string());

    if let Some(background) = &document.background {
        let background_node = tree.new_element(names.background);
        tree.append(mapping_node, background_node)
            .map_err(CodecError::xml)?;
        serialize_background_to_element(
            background,
            element_mut(&mut tree, background_node)?,
            &names,
        );
    }

    let entities_node = tree.new_element(names.entities);
    tree.append(mapping_node, entities_node)
        .map_err(CodecError::xml)?;
    for entity in &document.entities {
        trace!(kind = %entity.kind(), id = %entity.id(), "serializing entity");
        serialize_entity(&mut tree, &names, entities_node, entity)?;
    }

    let xml = tree
        .with_serialize_options(SerializeOptions { pretty: true })
        .to_string(root_node)
        .map_err(CodecError::xml)?;
    let xml = escape_attribute_whitespace(&xml);
    debug!(
        entities = document.entities.len(),
        bytes = xml.len(),
        "mapping serialized to xml"
    );
    Ok(xml)
}

/// Attribute value normalization turns raw tab, line feed and carriage return
/// into spaces on read, character references survive it.
fn escape_attribute_whitespace(xml: &str) -> String {
    let mut escaped = String::with_capacity(xml.len());
    let mut in_tag = false;
    let mut in_value = false;
    for c in xml.chars() {
        match c {
            '\t' if in_value => escaped.push_str("&#9;"),
            '\n' if in_value => escaped.push_str("&#10;"),
            '\r' if in_value => escaped.push_str("&#13;"),
            '"' if in_tag => {
                in_value = !in_value;
                escaped.push(c);
            }
            '<' if !in_value => {
                in_tag = true;
                escaped.push(c);
            }
            '>' if !in_value => {
                in_tag = false;
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

fn element_mut(tree: &mut Xot, node: Node) -> Result<&mut Element, CodecError> {
    tree.element_mut(node)
        .ok_or_else(|| CodecError::schema("freshly created node is not an element"))
}

fn set_optional(ele: &mut Element, name: NameId, value: &Option<String>) {
    if let Some(value) = value {
        ele.set_attribute(name, value.as_str());
    }
}

fn set_position(ele: &mut Element, x: NameId, y: NameId, position: &Vec2) {
    ele.set_attribute(x, format!("{}", position.x()));
    ele.set_attribute(y, format!("{}", position.y()));
}

fn serialize_background_to_element(
    background: &BackgroundImage,
    ele: &mut Element,
    names: &XmlNames,
) {
    ele.set_attribute(names.source, background.source.as_str());
    if let Some(width) = background.width {
        ele.set_attribute(names.width, width.to_string());
    }
    if let Some(height) = background.height {
        ele.set_attribute(names.height, height.to_string());
    }
}

fn serialize_entity(
    tree: &mut Xot,
    names: &XmlNames,
    parent: Node,
    entity: &MappingEntity,
) -> Result<(), CodecError> {
    let node = tree.new_element(names.element_of(entity.kind()));
    tree.append(parent, node).map_err(CodecError::xml)?;
    let ele = element_mut(tree, node)?;
    ele.set_attribute(names.id, entity.id().to_string());
    match entity {
        MappingEntity::Beacon(beacon) => {
            set_position(ele, names.x, names.y, &beacon.position);
            ele.set_attribute(names.name, beacon.name.as_str());
            set_optional(ele, names.ssid, &beacon.ssid);
            if let Some(tx_power) = beacon.tx_power {
                ele.set_attribute(names.tx_power, tx_power.to_string());
            }
        }
        MappingEntity::Venue(venue) => {
            set_position(ele, names.x, names.y, &venue.position);
            ele.set_attribute(names.name, venue.name.as_str());
            set_optional(ele, names.category, &venue.category);
        }
        MappingEntity::Measurement(measurement) => {
            set_position(ele, names.x1, names.y1, &measurement.start);
            set_position(ele, names.x2, names.y2, &measurement.end);
            set_optional(ele, names.label, &measurement.label);
        }
        MappingEntity::Marker(marker) => {
            ele.set_attribute(names.kind, marker.kind.to_string());
            set_position(ele, names.x, names.y, &marker.position);
            set_optional(ele, names.label, &marker.label);
        }
        MappingEntity::Path(path) => {
            set_optional(ele, names.name, &path.name);
            serialize_points(tree, names, node, &path.points)?;
        }
        MappingEntity::Polygon(polygon) => {
            set_optional(ele, names.name, &polygon.name);
            set_optional(ele, names.color, &polygon.color);
            serialize_points(tree, names, node, &polygon.points)?;
        }
    }
    Ok(())
}

fn serialize_points(
    tree: &mut Xot,
    names: &XmlNames,
    parent: Node,
    points: &[Vec2],
) -> Result<(), CodecError> {
    for point in points {
        let child = tree.new_element(names.point);
        tree.append(parent, child).map_err(CodecError::xml)?;
        set_position(element_mut(tree, child)?, names.x, names.y, point);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<a b=\"x\ny\"/>", "<a b=\"x&#10;y\"/>")]
    #[case("<a b=\"\t\r\"/>", "<a b=\"&#9;&#13;\"/>")]
    #[case("<a b=\"1 > 0\" c=\"\n\">\n  <d/>\n</a>\n", "<a b=\"1 > 0\" c=\"&#10;\">\n  <d/>\n</a>\n")]
    fn whitespace_in_attributes_is_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_attribute_whitespace(raw), expected);
    }
}
