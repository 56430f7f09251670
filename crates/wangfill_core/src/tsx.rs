//! Tiled `.tsx` tileset reader
//!
//! Only atlas tilesets are supported: one `<image>` cut into a grid of
//! `columns` tiles. Unknown elements and attributes are skipped.

use crate::signature::{WangId, WangSetType};
use crate::tileset::{Catalog, TileImage};
use crate::wangset::{WangColor, WangSet};
use crate::CatalogError;
use log::{debug, trace};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Parser state while walking the document
#[derive(Default)]
struct TsxState {
    catalog: Option<Catalog>,
    seen_tiles: HashSet<u32>,
    current_wang_set: Option<WangSet>,
    in_tile: bool,
}

impl TsxState {
    fn catalog_mut(&mut self, element: &str) -> Result<&mut Catalog, CatalogError> {
        self.catalog.as_mut().ok_or_else(|| {
            CatalogError::malformed(element, "", "element appears outside <tileset>")
        })
    }

    fn wang_set_mut(&mut self, element: &str) -> Result<&mut WangSet, CatalogError> {
        self.current_wang_set.as_mut().ok_or_else(|| {
            CatalogError::malformed(element, "", "element appears outside <wangset>")
        })
    }

    fn finish_wang_set(&mut self) -> Result<(), CatalogError> {
        if let Some(wang_set) = self.current_wang_set.take() {
            debug!(
                "Read wang set '{}' ({:?}, {} colors, {} tiles)",
                wang_set.name,
                wang_set.set_type,
                wang_set.color_count(),
                wang_set.tiles.len()
            );
            self.catalog_mut("wangset")?.add_wang_set(wang_set);
        }
        Ok(())
    }
}

/// Parse a `.tsx` document into an unvalidated catalog
pub(crate) fn parse_tsx(xml: &str) -> Result<Catalog, CatalogError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut state = TsxState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = get_element_name(e)?;
                start_element(&mut state, &name, e)?;
                if name == "tile" {
                    state.in_tile = true;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = get_element_name(e)?;
                start_element(&mut state, &name, e)?;
                if name == "wangset" {
                    state.finish_wang_set()?;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"wangset" => state.finish_wang_set()?,
                b"tile" => state.in_tile = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(CatalogError::Xml(e.to_string())),
            _ => {}
        }
    }

    state
        .catalog
        .ok_or_else(|| CatalogError::malformed("tileset", "", "missing <tileset> element"))
}

fn start_element(state: &mut TsxState, name: &str, e: &BytesStart) -> Result<(), CatalogError> {
    match name {
        "tileset" => {
            let attrs = parse_attributes(e)?;
            let catalog = Catalog::new(
                attrs.get("name").cloned().unwrap_or_default(),
                required(&attrs, "tileset", "tilewidth")?,
                required(&attrs, "tileset", "tileheight")?,
                required(&attrs, "tileset", "tilecount")?,
                required(&attrs, "tileset", "columns")?,
            )?
            .with_layout(
                optional(&attrs, "tileset", "spacing")?.unwrap_or(0),
                optional(&attrs, "tileset", "margin")?.unwrap_or(0),
            )?;
            state.catalog = Some(catalog);
        }
        "image" => {
            if state.in_tile {
                return Err(CatalogError::malformed(
                    "image",
                    "source",
                    "only atlas tilesets are supported",
                ));
            }
            let attrs = parse_attributes(e)?;
            let image = TileImage {
                source: required(&attrs, "image", "source")?,
                width: optional(&attrs, "image", "width")?,
                height: optional(&attrs, "image", "height")?,
            };
            let catalog = state.catalog_mut("image")?;
            catalog.image = Some(image);
        }
        "tile" => {
            let attrs = parse_attributes(e)?;
            let id: u32 = required(&attrs, "tile", "id")?;
            if !state.seen_tiles.insert(id) {
                return Err(CatalogError::malformed(
                    "tile",
                    "id",
                    format!("duplicate tile id {id}"),
                ));
            }
            let catalog = state.catalog_mut("tile")?;
            if id >= catalog.tile_count {
                return Err(CatalogError::malformed(
                    "tile",
                    "id",
                    format!("tile {id} is out of range (tilecount {})", catalog.tile_count),
                ));
            }
            if let Some(probability) = optional::<f32>(&attrs, "tile", "probability")? {
                check_probability("tile", probability)?;
                if let Ok(tile) = catalog.get(id) {
                    trace!("Tile {} probability {} -> {probability}", tile.id, tile.probability);
                }
                catalog
                    .set_probability(id, probability)
                    .map_err(|err| CatalogError::malformed("tile", "id", err.to_string()))?;
            }
        }
        "wangset" => {
            let attrs = parse_attributes(e)?;
            let set_name: String = required(&attrs, "wangset", "name")?;
            let type_name: String = required(&attrs, "wangset", "type")?;
            let set_type = WangSetType::parse(&type_name).ok_or_else(|| {
                CatalogError::malformed(
                    "wangset",
                    "type",
                    format!("unknown wang set type '{type_name}'"),
                )
            })?;
            let catalog_id = state.catalog_mut("wangset")?.id;
            state.current_wang_set = Some(WangSet::new(set_name, catalog_id, set_type));
        }
        "wangcolor" => {
            let attrs = parse_attributes(e)?;
            let mut color = WangColor::new(
                required(&attrs, "wangcolor", "name")?,
                attrs.get("color").cloned().unwrap_or_default(),
            );
            if let Some(probability) = optional::<f32>(&attrs, "wangcolor", "probability")? {
                check_probability("wangcolor", probability)?;
                color = color.with_probability(probability);
            }
            state.wang_set_mut("wangcolor")?.add_color(color);
        }
        "wangtile" => {
            let attrs = parse_attributes(e)?;
            let tile_id: u32 = required(&attrs, "wangtile", "tileid")?;
            let raw: String = required(&attrs, "wangtile", "wangid")?;
            let wang_id: WangId = raw.parse().map_err(|err| {
                CatalogError::malformed("wangtile", "wangid", format!("tile {tile_id}: {err}"))
            })?;
            let wang_set = state.wang_set_mut("wangtile")?;
            if wang_set.set_tile(tile_id, wang_id).is_some() {
                return Err(CatalogError::malformed(
                    "wangtile",
                    "tileid",
                    format!("duplicate tile {tile_id} in wang set '{}'", wang_set.name),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_probability(element: &str, probability: f32) -> Result<(), CatalogError> {
    if !probability.is_finite() || probability < 0.0 {
        return Err(CatalogError::malformed(
            element,
            "probability",
            format!("probability {probability} is out of range, expected a value >= 0"),
        ));
    }
    Ok(())
}

/// Get element name as String from BytesStart.
fn get_element_name(e: &BytesStart) -> Result<String, CatalogError> {
    std::str::from_utf8(e.name().as_ref())
        .map_err(|err| CatalogError::Xml(format!("invalid UTF-8: {err}")))
        .map(|s| s.to_string())
}

fn parse_attributes(elem: &BytesStart) -> Result<HashMap<String, String>, CatalogError> {
    let mut attrs = HashMap::new();
    for attr_result in elem.attributes() {
        let attr = attr_result.map_err(|e| CatalogError::Xml(format!("attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| CatalogError::Xml(format!("invalid UTF-8 in attribute key: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| CatalogError::Xml(format!("invalid attribute value: {e}")))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn required<T: FromStr>(
    attrs: &HashMap<String, String>,
    element: &str,
    field: &str,
) -> Result<T, CatalogError> {
    optional(attrs, element, field)?
        .ok_or_else(|| CatalogError::malformed(element, field, "missing required attribute"))
}

fn optional<T: FromStr>(
    attrs: &HashMap<String, String>,
    element: &str,
    field: &str,
) -> Result<Option<T>, CatalogError> {
    match attrs.get(field) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            CatalogError::malformed(element, field, format!("invalid value '{value}'"))
        }),
    }
}
