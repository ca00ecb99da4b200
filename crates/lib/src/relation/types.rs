use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current relation state format version.
pub const RELATIONS_VERSION: u32 = 1;

/// Identifier of a relation, assigned in increasing order as relations open.
pub type RelationId = u64;

/// Key/value data owned by one side of a relation.
pub type DataBag = BTreeMap<String, String>;

/// One open relation between the dispatcher and a producer application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
  pub id: RelationId,
  /// Relation name, which is the manifest category it carries.
  pub category: String,
  /// The producer application on the other side.
  pub remote_app: String,
  /// Data bags keyed by owning application.
  #[serde(default)]
  pub data: BTreeMap<String, DataBag>,
}

impl Relation {
  /// Data bag owned by `app`, if it has written anything.
  pub fn bag(&self, app: &str) -> Option<&DataBag> {
    self.data.get(app)
  }

  /// Mutable data bag owned by `app`, created on first access.
  pub fn bag_mut(&mut self, app: &str) -> &mut DataBag {
    self.data.entry(app.to_string()).or_default()
  }

  /// Value of `key` in the bag owned by `app`.
  pub fn get(&self, app: &str, key: &str) -> Option<&str> {
    self.bag(app).and_then(|bag| bag.get(key)).map(String::as_str)
  }

  /// Value of `key` in the remote application's bag.
  pub fn remote(&self, key: &str) -> Option<&str> {
    self.get(&self.remote_app, key)
  }
}

/// Every open relation, as seen from the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relations {
  pub version: u32,
  pub next_relation_id: RelationId,
  pub relations: Vec<Relation>,
}

impl Default for Relations {
  fn default() -> Self {
    Self::new()
  }
}

impl Relations {
  pub fn new() -> Self {
    Self {
      version: RELATIONS_VERSION,
      next_relation_id: 0,
      relations: Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.relations.is_empty()
  }

  pub fn len(&self) -> usize {
    self.relations.len()
  }

  /// Open a relation with `remote_app` on `category` and return its id.
  pub fn open(&mut self, category: &str, remote_app: &str) -> RelationId {
    let id = self.next_relation_id;
    self.next_relation_id += 1;
    self.relations.push(Relation {
      id,
      category: category.to_string(),
      remote_app: remote_app.to_string(),
      data: BTreeMap::new(),
    });
    id
  }

  /// Close a relation, returning it if it was open.
  pub fn close(&mut self, id: RelationId) -> Option<Relation> {
    let position = self.relations.iter().position(|r| r.id == id)?;
    Some(self.relations.remove(position))
  }

  pub fn get(&self, id: RelationId) -> Option<&Relation> {
    self.relations.iter().find(|r| r.id == id)
  }

  pub fn get_mut(&mut self, id: RelationId) -> Option<&mut Relation> {
    self.relations.iter_mut().find(|r| r.id == id)
  }

  /// Relations of `category`, ordered by relation id.
  pub fn for_category(&self, category: &str) -> Vec<&Relation> {
    let mut relations: Vec<&Relation> = self.relations.iter().filter(|r| r.category == category).collect();
    relations.sort_by_key(|r| r.id);
    relations
  }

  /// Relations of `category` whose other side is `app`, ordered by relation id.
  pub fn for_app_mut(&mut self, category: &str, app: &str) -> Vec<&mut Relation> {
    let mut relations: Vec<&mut Relation> = self
      .relations
      .iter_mut()
      .filter(|r| r.category == category && r.remote_app == app)
      .collect();
    relations.sort_by_key(|r| r.id);
    relations
  }
}
