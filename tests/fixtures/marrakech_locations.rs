//! Real Marrakech locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Medina sights sit within a couple
//! of kilometres of each other; gardens and day-trip sites are further out.

use daytrip_planner::Place;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self { id, name, lat, lng }
    }

    /// Place at this location with the default visit duration.
    pub fn place(&self, category: &str) -> Place {
        Place::new(self.id, self.name, category).at(self.lat, self.lng)
    }
}

// ============================================================================
// Riads / Hotels (start locations)
// ============================================================================

pub const RIAD_YASMINE: Location = Location::new("riad-yasmine", "Riad Yasmine", 31.6334, -7.9880);
pub const LA_MAMOUNIA: Location = Location::new("la-mamounia", "La Mamounia", 31.6215, -7.9981);

// ============================================================================
// Medina Sights
// ============================================================================

pub const KOUTOUBIA: Location = Location::new("koutoubia", "Koutoubia Mosque", 31.6237, -7.9937);
pub const BAHIA_PALACE: Location = Location::new("bahia", "Bahia Palace", 31.6216, -7.9829);
pub const SAADIAN_TOMBS: Location = Location::new("saadian", "Saadian Tombs", 31.6173, -7.9887);
pub const EL_BADI: Location = Location::new("el-badi", "El Badi Palace", 31.6185, -7.9856);
pub const BEN_YOUSSEF: Location = Location::new("ben-youssef", "Ben Youssef Madrasa", 31.6318, -7.9864);
pub const DAR_SI_SAID: Location = Location::new("dar-si-said", "Dar Si Said Museum", 31.6245, -7.9834);
pub const MAISON_PHOTO: Location =
    Location::new("maison-photo", "Maison de la Photographie", 31.6318, -7.9857);
pub const JEMAA_EL_FNAA: Location = Location::new("jemaa", "Jemaa el-Fnaa", 31.6258, -7.9891);

pub const MEDINA_SIGHTS: &[Location] = &[
    KOUTOUBIA,
    BAHIA_PALACE,
    SAADIAN_TOMBS,
    EL_BADI,
    BEN_YOUSSEF,
    DAR_SI_SAID,
    MAISON_PHOTO,
];

// ============================================================================
// Restaurants
// ============================================================================

pub const NOMAD: Location = Location::new("nomad", "Nomad", 31.6297, -7.9865);
pub const CAFE_DES_EPICES: Location = Location::new("cafe-epices", "Cafe des Epices", 31.6300, -7.9868);
pub const DAR_YACOUT: Location = Location::new("dar-yacout", "Dar Yacout", 31.6339, -7.9926);

// ============================================================================
// Experiences
// ============================================================================

pub const MAISON_ARABE_COOKING: Location =
    Location::new("cooking", "La Maison Arabe Cooking Class", 31.6310, -7.9960);
pub const HAMMAM_DE_LA_ROSE: Location = Location::new("hammam", "Hammam de la Rose", 31.6320, -7.9895);

// ============================================================================
// Gardens / Outskirts
// ============================================================================

pub const MAJORELLE: Location = Location::new("majorelle", "Jardin Majorelle", 31.6417, -8.0035);
pub const MENARA: Location = Location::new("menara", "Menara Gardens", 31.6133, -8.0226);
pub const AGDAL: Location = Location::new("agdal", "Agdal Gardens", 31.6047, -7.9881);

// ============================================================================
// Day Trips (transport zones)
// ============================================================================

pub const AGAFAY: Location = Location::new("agafay", "Agafay Desert Camp", 31.4460, -8.1730);
pub const PALMERAIE_QUAD: Location = Location::new("quad", "Palmeraie Quad Tour", 31.6700, -7.9600);

/// Every fixture location.
pub fn all_locations() -> Vec<Location> {
    let mut all = vec![RIAD_YASMINE, LA_MAMOUNIA];
    all.extend_from_slice(MEDINA_SIGHTS);
    all.extend([
        JEMAA_EL_FNAA,
        NOMAD,
        CAFE_DES_EPICES,
        DAR_YACOUT,
        MAISON_ARABE_COOKING,
        HAMMAM_DE_LA_ROSE,
        MAJORELLE,
        MENARA,
        AGDAL,
        AGAFAY,
        PALMERAIE_QUAD,
    ]);
    all
}

/// Start at the riad, then `sights` in order as plain monuments.
pub fn medina_walk(sights: &[Location]) -> Vec<Place> {
    let mut places = vec![RIAD_YASMINE.place("hotel")];
    places.extend(sights.iter().map(|loc| loc.place("monument")));
    places
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_marrakech_area() {
        for loc in all_locations() {
            assert!(loc.lat > 31.4 && loc.lat < 31.7, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(loc.lng > -8.2 && loc.lng < -7.9, "{} lng out of range: {}", loc.name, loc.lng);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let all = all_locations();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
