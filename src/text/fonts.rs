use std::sync::Arc;

use usvg::fontdb;

use crate::{
    assets::store::AssetStore,
    config::FontCandidate,
    foundation::error::{StampError, StampResult},
};

#[derive(Clone, Debug)]
/// Outline font bytes plus the face picked inside them.
pub(crate) struct OutlineFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
    pub(crate) family: String,
}

#[derive(Clone, Debug)]
/// Font used for every information band of a compositor.
pub(crate) enum BandFont {
    Outline(OutlineFont),
    Builtin,
}

impl BandFont {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Outline(f) => format!("{} (face {})", f.family, f.index),
            Self::Builtin => "builtin bitmap".to_string(),
        }
    }
}

/// Walk the candidate chain and return the first font that loads.
///
/// Never fails: an exhausted chain resolves to the embedded bitmap font.
pub(crate) fn resolve_band_font(candidates: &[FontCandidate], store: &AssetStore) -> BandFont {
    let mut system: Option<fontdb::Database> = None;
    for candidate in candidates {
        match load_candidate(candidate, store, &mut system) {
            Ok(font) => {
                tracing::debug!(?candidate, font = %font.describe(), "font candidate loaded");
                return font;
            }
            Err(e) => tracing::debug!(?candidate, error = %e, "font candidate skipped"),
        }
    }
    tracing::warn!("no font candidate loaded, using builtin bitmap font");
    BandFont::Builtin
}

fn load_candidate(
    candidate: &FontCandidate,
    store: &AssetStore,
    system: &mut Option<fontdb::Database>,
) -> StampResult<BandFont> {
    match candidate {
        FontCandidate::Builtin => Ok(BandFont::Builtin),
        FontCandidate::File(path) => {
            let p = store.font_path(path);
            let bytes = std::fs::read(&p).map_err(|e| {
                StampError::validation(format!("failed to read font '{}': {e}", p.display()))
            })?;
            outline_from_bytes(bytes).map(BandFont::Outline)
        }
        FontCandidate::Family(name) => {
            query_system(system, fontdb::Family::Name(name)).map(BandFont::Outline)
        }
        FontCandidate::SansSerif => {
            query_system(system, fontdb::Family::SansSerif).map(BandFont::Outline)
        }
    }
}

/// Validate raw font bytes and pick their first face.
pub(crate) fn outline_from_bytes(bytes: Vec<u8>) -> StampResult<OutlineFont> {
    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.clone());
    let face = db
        .faces()
        .next()
        .ok_or_else(|| StampError::validation("font data contains no usable face"))?;
    let family = face
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| face.post_script_name.clone());
    Ok(OutlineFont {
        index: face.index,
        family,
        bytes: Arc::new(bytes),
    })
}

fn query_system(
    system: &mut Option<fontdb::Database>,
    family: fontdb::Family<'_>,
) -> StampResult<OutlineFont> {
    let db = system.get_or_insert_with(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        db
    });
    let families = [family];
    let id = db
        .query(&fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        })
        .ok_or_else(|| StampError::validation("no installed font matches"))?;
    let name = db
        .face(id)
        .and_then(|f| f.families.first().map(|(n, _)| n.clone()))
        .unwrap_or_default();
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| StampError::validation("installed font data unavailable"))?;
    Ok(OutlineFont {
        bytes: Arc::new(bytes),
        index,
        family: name,
    })
}

/// Locate any installed sans-serif font, for callers that want to test outline text.
#[cfg(test)]
pub(crate) fn system_sans_for_tests() -> Option<OutlineFont> {
    query_system(&mut None, fontdb::Family::SansSerif).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
