//! XML reader and writer for [`MapDocument`]
//!
//! ```text
//! <map width="W" height="H" exporter="...">
//!   <tile x="0" y="0" height="0" caveHeight="0" caveSize="0">
//!     <ground id="gr" dir="NW"/>
//!     <cave id="rock"/>
//!     <level value="0">
//!       <floor id="pl" orientation="UP"/>
//!       <hWall id="ww" reversed="false"/>
//!       <object id="barrel" x="2" y="2" rotation="0"/>
//!     </level>
//!   </tile>
//! </map>
//! ```

use crate::document::{EntityDocument, GroundDocument, LevelDocument, MapDocument, TileDocument};
use crate::entity::{FloorOrientation, RoadDirection};
use crate::error::DocumentError;
use crate::tile::CENTRAL_POSITION;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;

type Attributes = HashMap<String, String>;

fn read_attributes(element: &BytesStart) -> Result<Attributes, DocumentError> {
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn required<'a>(
    attributes: &'a Attributes,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, DocumentError> {
    attributes
        .get(attribute)
        .map(String::as_str)
        .ok_or(DocumentError::MissingAttribute { element, attribute })
}

fn parse_value<T: FromStr>(attribute: &str, value: &str) -> Result<T, DocumentError> {
    value.trim().parse().map_err(|_| DocumentError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

fn required_number<T: FromStr>(
    attributes: &Attributes,
    element: &'static str,
    attribute: &'static str,
) -> Result<T, DocumentError> {
    parse_value(attribute, required(attributes, element, attribute)?)
}

fn optional_number<T: FromStr>(attributes: &Attributes, attribute: &str, default: T) -> Result<T, DocumentError> {
    match attributes.get(attribute) {
        Some(value) => parse_value(attribute, value),
        None => Ok(default),
    }
}

fn parse_color(value: &str) -> Result<[f32; 3], DocumentError> {
    let invalid = || DocumentError::InvalidAttribute {
        attribute: "color".to_string(),
        value: value.to_string(),
    };
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(invalid()),
    }
}

/// Whole-number attribute that may be written as a float; the fraction is dropped
fn truncated_number(attributes: &Attributes, attribute: &str) -> i32 {
    let Some(value) = attributes.get(attribute) else {
        return 0;
    };
    match value.trim().parse::<f32>() {
        Ok(number) => number as i32,
        Err(_) => {
            tracing::warn!("Invalid value '{}' for attribute '{}', using 0", value, attribute);
            0
        }
    }
}

fn flag(attributes: &Attributes, attribute: &str) -> bool {
    attributes
        .get(attribute)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn orientation(attributes: &Attributes) -> FloorOrientation {
    let Some(value) = attributes.get("orientation") else {
        return FloorOrientation::default();
    };
    value.parse().unwrap_or_else(|_| {
        tracing::warn!("Unknown floor orientation '{}', using DOWN", value);
        FloorOrientation::Down
    })
}

/// Sub-tile position named by the older `position` attribute, e.g.
/// `TOP_LEFT`, `CENTER` or `BOTTOM`
fn named_position(value: &str) -> Option<(f32, f32)> {
    let mut position = CENTRAL_POSITION;
    for part in value.trim().split('_') {
        match part.to_ascii_uppercase().as_str() {
            "LEFT" => position.0 = 1.0,
            "RIGHT" => position.0 = 3.0,
            "TOP" => position.1 = 3.0,
            "BOTTOM" => position.1 = 1.0,
            "CENTER" | "MIDDLE" => {}
            _ => return None,
        }
    }
    Some(position)
}

fn object_position(attributes: &Attributes) -> Result<(f32, f32), DocumentError> {
    if let (Some(x), Some(y)) = (attributes.get("x"), attributes.get("y")) {
        return Ok((parse_value("x", x)?, parse_value("y", y)?));
    }
    let value = required(attributes, "object", "position")?;
    named_position(value).ok_or_else(|| DocumentError::InvalidAttribute {
        attribute: "position".to_string(),
        value: value.to_string(),
    })
}

fn read_entity(name: &str, attributes: &Attributes) -> Result<Option<EntityDocument>, DocumentError> {
    let entity = match name.to_ascii_lowercase().as_str() {
        "floor" => EntityDocument::Floor {
            id: required(attributes, "floor", "id")?.to_string(),
            orientation: orientation(attributes),
        },
        "roof" => EntityDocument::Roof {
            id: required(attributes, "roof", "id")?.to_string(),
        },
        "hwall" => EntityDocument::HWall {
            id: required(attributes, "hWall", "id")?.to_string(),
            reversed: flag(attributes, "reversed"),
        },
        "vwall" => EntityDocument::VWall {
            id: required(attributes, "vWall", "id")?.to_string(),
            reversed: flag(attributes, "reversed"),
        },
        "object" => {
            let (x, y) = object_position(attributes)?;
            EntityDocument::Object {
                id: required(attributes, "object", "id")?.to_string(),
                x,
                y,
                rotation: optional_number(attributes, "rotation", 0.0)?,
            }
        }
        "label" => EntityDocument::Label {
            text: attributes.get("text").cloned().unwrap_or_default(),
            color: match attributes.get("color") {
                Some(value) => parse_color(value)?,
                None => [1.0, 1.0, 1.0],
            },
        },
        _ => return Ok(None),
    };
    Ok(Some(entity))
}

/// Parse a map document from XML text
pub fn read_map_document(content: &str) -> Result<MapDocument, DocumentError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut document: Option<MapDocument> = None;
    let mut tile: Option<TileDocument> = None;
    let mut level: Option<LevelDocument> = None;

    loop {
        let (element, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                close_element(e.name().as_ref(), &mut document, &mut tile, &mut level);
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let attributes = read_attributes(&element)?;

        let Some(map) = document.as_mut() else {
            if name != "map" {
                return Err(DocumentError::UnexpectedRoot(name));
            }
            document = Some(MapDocument {
                width: required_number(&attributes, "map", "width")?,
                height: required_number(&attributes, "map", "height")?,
                exporter: attributes.get("exporter").cloned().unwrap_or_default(),
                tiles: Vec::new(),
            });
            continue;
        };

        match name.as_str() {
            "tile" => {
                let opened = TileDocument {
                    x: required_number(&attributes, "tile", "x")?,
                    y: required_number(&attributes, "tile", "y")?,
                    height: truncated_number(&attributes, "height"),
                    cave_height: truncated_number(&attributes, "caveHeight"),
                    cave_size: truncated_number(&attributes, "caveSize"),
                    ground: GroundDocument {
                        id: crate::constants::DEFAULT_GROUND.to_string(),
                        dir: RoadDirection::Center,
                    },
                    cave: None,
                    levels: Vec::new(),
                };
                if empty {
                    map.tiles.push(opened);
                } else {
                    tile = Some(opened);
                }
            }
            "ground" => {
                if let Some(tile) = tile.as_mut() {
                    match required(&attributes, "ground", "id") {
                        Ok(id) => {
                            tile.ground = GroundDocument {
                                id: id.to_string(),
                                dir: attributes
                                    .get("dir")
                                    .map(|dir| RoadDirection::parse(dir))
                                    .unwrap_or_default(),
                            };
                        }
                        Err(e) => tracing::warn!("Skipping ground of ({}, {}): {}", tile.x, tile.y, e),
                    }
                }
            }
            "cave" => {
                if let Some(tile) = tile.as_mut() {
                    match required(&attributes, "cave", "id") {
                        Ok(id) => tile.cave = Some(id.to_string()),
                        Err(e) => tracing::warn!("Skipping cave of ({}, {}): {}", tile.x, tile.y, e),
                    }
                }
            }
            "level" => {
                let opened = LevelDocument {
                    value: required_number(&attributes, "level", "value")?,
                    entities: Vec::new(),
                };
                if empty {
                    if let Some(tile) = tile.as_mut() {
                        tile.levels.push(opened);
                    }
                } else {
                    level = Some(opened);
                }
            }
            other => match (read_entity(other, &attributes), level.as_mut()) {
                (Ok(Some(entity)), Some(level)) => level.entities.push(entity),
                (Ok(Some(_)), None) => {
                    tracing::warn!("Ignoring <{}> outside of a <level>", other);
                }
                (Ok(None), _) => tracing::debug!("Ignoring unknown element <{}>", other),
                (Err(e), _) => tracing::warn!("Skipping <{}>: {}", other, e),
            },
        }
    }

    document.ok_or_else(|| DocumentError::UnexpectedRoot(String::new()))
}

fn close_element(
    name: &[u8],
    document: &mut Option<MapDocument>,
    tile: &mut Option<TileDocument>,
    level: &mut Option<LevelDocument>,
) {
    match name {
        b"level" => {
            if let (Some(closed), Some(tile)) = (level.take(), tile.as_mut()) {
                tile.levels.push(closed);
            }
        }
        b"tile" => {
            if let (Some(closed), Some(document)) = (tile.take(), document.as_mut()) {
                document.tiles.push(closed);
            }
        }
        _ => {}
    }
}

fn entity_element(entity: &EntityDocument) -> BytesStart<'static> {
    let mut element = BytesStart::new(entity.element_name());
    match entity {
        EntityDocument::Floor { id, orientation } => {
            element.push_attribute(("id", id.as_str()));
            element.push_attribute(("orientation", orientation.as_str()));
        }
        EntityDocument::Roof { id } => {
            element.push_attribute(("id", id.as_str()));
        }
        EntityDocument::HWall { id, reversed } | EntityDocument::VWall { id, reversed } => {
            element.push_attribute(("id", id.as_str()));
            element.push_attribute(("reversed", reversed.to_string().as_str()));
        }
        EntityDocument::Object { id, x, y, rotation } => {
            element.push_attribute(("id", id.as_str()));
            element.push_attribute(("x", x.to_string().as_str()));
            element.push_attribute(("y", y.to_string().as_str()));
            element.push_attribute(("rotation", rotation.to_string().as_str()));
        }
        EntityDocument::Label { text, color } => {
            let color = format!("{},{},{}", color[0], color[1], color[2]);
            element.push_attribute(("text", text.as_str()));
            element.push_attribute(("color", color.as_str()));
        }
    }
    element
}

/// Render a map document as indented XML
pub fn write_map_document(document: &MapDocument) -> Result<String, DocumentError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut map = BytesStart::new("map");
    map.push_attribute(("width", document.width.to_string().as_str()));
    map.push_attribute(("height", document.height.to_string().as_str()));
    map.push_attribute(("exporter", document.exporter.as_str()));
    writer.write_event(Event::Start(map))?;

    for tile in &document.tiles {
        let mut element = BytesStart::new("tile");
        element.push_attribute(("x", tile.x.to_string().as_str()));
        element.push_attribute(("y", tile.y.to_string().as_str()));
        element.push_attribute(("height", tile.height.to_string().as_str()));
        element.push_attribute(("caveHeight", tile.cave_height.to_string().as_str()));
        element.push_attribute(("caveSize", tile.cave_size.to_string().as_str()));
        writer.write_event(Event::Start(element))?;

        let mut ground = BytesStart::new("ground");
        ground.push_attribute(("id", tile.ground.id.as_str()));
        if tile.ground.dir != RoadDirection::Center {
            ground.push_attribute(("dir", tile.ground.dir.as_str()));
        }
        writer.write_event(Event::Empty(ground))?;

        if let Some(cave) = &tile.cave {
            let mut element = BytesStart::new("cave");
            element.push_attribute(("id", cave.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        for level in &tile.levels {
            let mut element = BytesStart::new("level");
            element.push_attribute(("value", level.value.to_string().as_str()));
            writer.write_event(Event::Start(element))?;
            for entity in &level.entities {
                writer.write_event(Event::Empty(entity_element(entity)))?;
            }
            writer.write_event(Event::End(BytesEnd::new("level")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("tile")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("map")))?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| DocumentError::Xml(e.to_string()))
}
