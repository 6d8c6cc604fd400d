//! Catalog of what the ship has detected and explored.
//!
//! The simulation talks to the catalog through the [`Catalog`] trait.
//! [`MemoryCatalog`] keeps records in ordered maps so iteration (and thus
//! random selection over it) is deterministic, plus a location index that
//! enforces one record per grid cell.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{Contact, ContactId, Depth, GridPos, NewPoi, Poi, PoiId, PoiKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Contacts,
    Pois,
}

pub trait Catalog {
    fn find_contact_id(&self, pos: GridPos) -> Option<ContactId>;
    fn find_poi_id(&self, pos: GridPos) -> Option<PoiId>;
    fn contact(&self, id: &ContactId) -> Option<&Contact>;
    fn poi(&self, id: &PoiId) -> Option<&Poi>;
    /// Registers new contacts. Cells already holding a contact or POI are
    /// skipped; returns the ids actually created.
    fn insert_contacts(&mut self, contacts: &[(GridPos, Depth)]) -> Vec<ContactId>;
    /// Creates a POI, replacing any contact still registered at its cell.
    fn insert_poi(&mut self, poi: NewPoi) -> PoiId;
    fn update_poi_images(&mut self, id: &PoiId, images: Vec<String>);
    fn delete_contact(&mut self, id: &ContactId);
    fn all_contacts(&self) -> Vec<&Contact>;
    fn pois_by_kind(&self, kind: PoiKind) -> Vec<&Poi>;
    fn count(&self, table: Table) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupant {
    Contact(u64),
    Poi(u64),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CatalogRecord", into = "CatalogRecord")]
pub struct MemoryCatalog {
    contacts: BTreeMap<u64, Contact>,
    pois: BTreeMap<u64, Poi>,
    by_cell: AHashMap<GridPos, Occupant>,
    next_contact: u64,
    next_poi: u64,
}

/// Persisted form. The location index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct CatalogRecord {
    contacts: Vec<Contact>,
    pois: Vec<Poi>,
    next_contact: u64,
    next_poi: u64,
}

fn contact_key(id: &ContactId) -> Option<u64> {
    id.0.strip_prefix("contact_")?.parse().ok()
}

fn poi_key(id: &PoiId) -> Option<u64> {
    id.0.strip_prefix("poi_")?.parse().ok()
}

impl From<CatalogRecord> for MemoryCatalog {
    fn from(record: CatalogRecord) -> Self {
        let mut catalog = MemoryCatalog {
            next_contact: record.next_contact,
            next_poi: record.next_poi,
            ..MemoryCatalog::default()
        };
        for contact in record.contacts {
            if let Some(key) = contact_key(&contact.id) {
                catalog.by_cell.insert(contact.pos, Occupant::Contact(key));
                catalog.contacts.insert(key, contact);
            }
        }
        for poi in record.pois {
            if let Some(key) = poi_key(&poi.id) {
                catalog.by_cell.insert(poi.pos, Occupant::Poi(key));
                catalog.pois.insert(key, poi);
            }
        }
        catalog
    }
}

impl From<MemoryCatalog> for CatalogRecord {
    fn from(catalog: MemoryCatalog) -> Self {
        CatalogRecord {
            contacts: catalog.contacts.into_values().collect(),
            pois: catalog.pois.into_values().collect(),
            next_contact: catalog.next_contact,
            next_poi: catalog.next_poi,
        }
    }
}

impl PartialEq for MemoryCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.contacts == other.contacts
            && self.pois == other.pois
            && self.next_contact == other.next_contact
            && self.next_poi == other.next_poi
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Catalog for MemoryCatalog {
    fn find_contact_id(&self, pos: GridPos) -> Option<ContactId> {
        match self.by_cell.get(&pos)? {
            Occupant::Contact(key) => self.contacts.get(key).map(|c| c.id.clone()),
            Occupant::Poi(_) => None,
        }
    }

    fn find_poi_id(&self, pos: GridPos) -> Option<PoiId> {
        match self.by_cell.get(&pos)? {
            Occupant::Poi(key) => self.pois.get(key).map(|p| p.id.clone()),
            Occupant::Contact(_) => None,
        }
    }

    fn contact(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.get(&contact_key(id)?)
    }

    fn poi(&self, id: &PoiId) -> Option<&Poi> {
        self.pois.get(&poi_key(id)?)
    }

    fn insert_contacts(&mut self, contacts: &[(GridPos, Depth)]) -> Vec<ContactId> {
        let mut created = Vec::new();
        for (pos, depth) in contacts {
            if self.by_cell.contains_key(pos) {
                continue;
            }
            self.next_contact += 1;
            let key = self.next_contact;
            let id = ContactId(format!("contact_{key:06}"));
            self.contacts.insert(
                key,
                Contact {
                    id: id.clone(),
                    pos: *pos,
                    depth: *depth,
                },
            );
            self.by_cell.insert(*pos, Occupant::Contact(key));
            created.push(id);
        }
        created
    }

    fn insert_poi(&mut self, poi: NewPoi) -> PoiId {
        if let Some(Occupant::Contact(key)) = self.by_cell.get(&poi.pos).copied() {
            self.contacts.remove(&key);
        }
        self.next_poi += 1;
        let key = self.next_poi;
        let id = PoiId(format!("poi_{key:06}"));
        self.by_cell.insert(poi.pos, Occupant::Poi(key));
        self.pois.insert(
            key,
            Poi {
                id: id.clone(),
                pos: poi.pos,
                depth: poi.depth,
                name: poi.name,
                profile: poi.profile,
                description: poi.description,
                images: poi.images,
            },
        );
        id
    }

    fn update_poi_images(&mut self, id: &PoiId, images: Vec<String>) {
        if let Some(poi) = poi_key(id).and_then(|key| self.pois.get_mut(&key)) {
            poi.images = images;
        }
    }

    fn delete_contact(&mut self, id: &ContactId) {
        let Some(key) = contact_key(id) else {
            return;
        };
        if let Some(contact) = self.contacts.remove(&key) {
            self.by_cell.remove(&contact.pos);
        }
    }

    fn all_contacts(&self) -> Vec<&Contact> {
        self.contacts.values().collect()
    }

    fn pois_by_kind(&self, kind: PoiKind) -> Vec<&Poi> {
        self.pois
            .values()
            .filter(|poi| poi.profile.kind == kind)
            .collect()
    }

    fn count(&self, table: Table) -> usize {
        match table {
            Table::Contacts => self.contacts.len(),
            Table::Pois => self.pois.len(),
        }
    }
}
