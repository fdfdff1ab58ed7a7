use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};

use crate::generator::{
  document::ComponentSchemas,
  naming::identifiers::{ensure_unique, to_graphql_type_name},
  schema::{ObjectNode, ScalarKind, SchemaNode},
};

fn detect_cycles(dependencies: &IndexMap<String, IndexSet<String>>) -> Vec<Vec<String>> {
  let mut graph = DiGraphMap::<&str, ()>::new();
  for (node, deps) in dependencies {
    graph.add_node(node.as_str());
    for dep in deps {
      graph.add_edge(node.as_str(), dep.as_str(), ());
    }
  }

  let mut cycles = kosaraju_scc(&graph)
    .into_iter()
    .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
    .map(|scc| {
      let mut cycle = scc.into_iter().map(String::from).collect::<Vec<_>>();
      cycle.sort();
      cycle
    })
    .collect::<Vec<_>>();
  cycles.sort();
  cycles
}

fn collect_references(node: &SchemaNode, refs: &mut IndexSet<String>) {
  match node {
    SchemaNode::Reference(name) => {
      refs.insert(name.clone());
    }
    SchemaNode::Array(item) => collect_references(item, refs),
    SchemaNode::Object(object) => {
      for property in object.properties.values() {
        collect_references(property, refs);
      }
    }
    SchemaNode::Union(members) => {
      for member in members {
        collect_references(member, refs);
      }
    }
    SchemaNode::Primitive(_) => {}
  }
}

/// Every named schema the generator can emit: the document's component
/// schemas in declaration order, followed by types hoisted out of inline
/// objects in discovery order. Immutable once built.
///
/// Entries are keyed by their schema name; each also owns a GraphQL type name
/// that is unique across the whole registry.
#[derive(Debug)]
pub(crate) struct SchemaRegistry {
  schemas: IndexMap<String, SchemaNode>,
  type_names: IndexMap<String, String>,
  hoisted: IndexSet<String>,
  dependencies: IndexMap<String, IndexSet<String>>,
}

impl SchemaRegistry {
  /// Malformed component schemas are left out, so references to them stay
  /// unresolved.
  pub(crate) fn builder(components: &ComponentSchemas) -> SchemaRegistryBuilder {
    SchemaRegistryBuilder::new(components)
  }

  pub(crate) fn resolve(&self, name: &str) -> Option<&SchemaNode> {
    self.schemas.get(name)
  }

  pub(crate) fn entries(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
    self.schemas.iter()
  }

  /// Schema name to GraphQL type name, without namespace.
  pub(crate) fn type_names(&self) -> &IndexMap<String, String> {
    &self.type_names
  }

  pub(crate) fn is_hoisted(&self, name: &str) -> bool {
    self.hoisted.contains(name)
  }

  pub(crate) fn hoisted_count(&self) -> usize {
    self.hoisted.len()
  }

  /// Strongly connected groups of schemas that reference themselves,
  /// directly or transitively.
  pub(crate) fn detect_cycles(&self) -> Vec<Vec<String>> {
    detect_cycles(&self.dependencies)
  }

  /// Whether a field of this schema needs a nested selection: objects, arrays
  /// of composite items, unions with a composite member, and references that
  /// resolve to one of those. Unresolved references are opaque scalars.
  pub(crate) fn is_composite(&self, node: &SchemaNode) -> bool {
    self.is_composite_guarded(node, &mut BTreeSet::new())
  }

  fn is_composite_guarded<'a>(&'a self, node: &'a SchemaNode, seen: &mut BTreeSet<&'a str>) -> bool {
    match node {
      SchemaNode::Object(_) => true,
      SchemaNode::Primitive(_) => false,
      SchemaNode::Array(item) => self.is_composite_guarded(item, seen),
      SchemaNode::Union(members) => members.iter().any(|member| self.is_composite_guarded(member, seen)),
      SchemaNode::Reference(name) => {
        if !seen.insert(name.as_str()) {
          return false;
        }
        self
          .resolve(name)
          .is_some_and(|target| self.is_composite_guarded(target, seen))
      }
    }
  }

  /// Replaces references to scalar schemas with the scalar they alias and
  /// unresolved references with an opaque scalar. Composite references are
  /// left as they are.
  pub(crate) fn flatten_scalars(&self, node: &SchemaNode) -> SchemaNode {
    self.flatten_guarded(node, &mut BTreeSet::new())
  }

  fn flatten_guarded<'a>(&'a self, node: &'a SchemaNode, seen: &mut BTreeSet<&'a str>) -> SchemaNode {
    match node {
      SchemaNode::Reference(name) => match self.resolve(name) {
        Some(target) if self.is_composite(target) => node.clone(),
        Some(target) if !seen.contains(name.as_str()) => {
          seen.insert(name.as_str());
          let flattened = self.flatten_guarded(target, seen);
          seen.remove(name.as_str());
          flattened
        }
        _ => SchemaNode::Primitive(ScalarKind::Any),
      },
      SchemaNode::Array(item) => SchemaNode::array(self.flatten_guarded(item, seen)),
      SchemaNode::Union(members) => {
        SchemaNode::Union(members.iter().map(|member| self.flatten_guarded(member, seen)).collect())
      }
      other => other.clone(),
    }
  }

  /// Replaces only unresolved references with an opaque scalar, recursing
  /// through arrays and unions.
  pub(crate) fn degrade_unresolved(&self, node: &SchemaNode) -> SchemaNode {
    match node {
      SchemaNode::Reference(name) if self.resolve(name).is_none() => SchemaNode::Primitive(ScalarKind::Any),
      SchemaNode::Array(item) => SchemaNode::array(self.degrade_unresolved(item)),
      SchemaNode::Union(members) => {
        SchemaNode::Union(members.iter().map(|member| self.degrade_unresolved(member)).collect())
      }
      other => other.clone(),
    }
  }
}

/// Collects component schemas and hoists every nested inline object into a
/// named entry so each object type the schema emitter meets has a name.
#[derive(Debug)]
pub(crate) struct SchemaRegistryBuilder {
  components: IndexMap<String, SchemaNode>,
  hoisted: IndexMap<String, SchemaNode>,
  type_names: IndexMap<String, String>,
  /// Schema names and GraphQL type names already handed out.
  taken: BTreeSet<String>,
}

impl SchemaRegistryBuilder {
  fn new(components: &ComponentSchemas) -> Self {
    let mut builder = Self {
      components: IndexMap::new(),
      hoisted: IndexMap::new(),
      type_names: IndexMap::new(),
      taken: components.keys().cloned().collect(),
    };

    let valid = components
      .iter()
      .filter_map(|(name, raw)| Some((name, raw.valid()?)))
      .collect::<Vec<_>>();

    // names normalizing to the same GraphQL name are suffixed in declaration order
    let mut assigned = BTreeSet::new();
    let type_names = valid
      .iter()
      .map(|(name, _)| {
        let type_name = ensure_unique(&to_graphql_type_name(name), &assigned);
        assigned.insert(type_name.clone());
        type_name
      })
      .collect::<Vec<_>>();
    builder.taken.extend(assigned);

    for ((name, raw), type_name) in valid.into_iter().zip(type_names) {
      let node = builder.hoist_component(&type_name, SchemaNode::from(raw));
      builder.components.insert(name.clone(), node);
      builder.type_names.insert(name.clone(), type_name);
    }

    builder
  }

  /// Hoists the root of a response body. An inline object becomes a named
  /// type called `base_name` (made unique) and a reference to it is returned.
  pub(crate) fn hoist_response(&mut self, base_name: &str, node: SchemaNode) -> SchemaNode {
    self.lift(base_name, node)
  }

  fn hoist_component(&mut self, type_name: &str, node: SchemaNode) -> SchemaNode {
    match node {
      SchemaNode::Object(object) => SchemaNode::Object(self.hoist_properties(type_name, object)),
      other => self.lift(type_name, other),
    }
  }

  fn lift(&mut self, base_name: &str, node: SchemaNode) -> SchemaNode {
    match node {
      SchemaNode::Object(object) => {
        let name = ensure_unique(&to_graphql_type_name(base_name), &self.taken);
        self.taken.insert(name.clone());
        self.type_names.insert(name.clone(), name.clone());
        // reserve the slot first so nested types follow their parent
        self.hoisted.insert(name.clone(), SchemaNode::Object(ObjectNode::default()));
        let object = self.hoist_properties(&name, object);
        self.hoisted.insert(name.clone(), SchemaNode::Object(object));
        SchemaNode::Reference(name)
      }
      SchemaNode::Array(item) => SchemaNode::array(self.lift(&format!("{base_name}Item"), *item)),
      SchemaNode::Union(members) => SchemaNode::Union(
        members
          .into_iter()
          .enumerate()
          .map(|(index, member)| self.lift(&format!("{base_name}Variant{}", index + 1), member))
          .collect(),
      ),
      other => other,
    }
  }

  fn hoist_properties(&mut self, parent: &str, object: ObjectNode) -> ObjectNode {
    let properties = object
      .properties
      .into_iter()
      .map(|(property, node)| {
        let base_name = format!("{parent}{}", to_graphql_type_name(&property));
        let node = self.lift(&base_name, node);
        (property, node)
      })
      .collect();

    ObjectNode {
      properties,
      required: object.required,
    }
  }

  pub(crate) fn build(self) -> SchemaRegistry {
    let hoisted = self.hoisted.keys().cloned().collect::<IndexSet<_>>();
    let schemas = self
      .components
      .into_iter()
      .chain(self.hoisted)
      .collect::<IndexMap<_, _>>();

    let dependencies = schemas
      .iter()
      .map(|(name, node)| {
        let mut refs = IndexSet::new();
        collect_references(node, &mut refs);
        (name.clone(), refs)
      })
      .collect();

    SchemaRegistry {
      schemas,
      type_names: self.type_names,
      hoisted,
      dependencies,
    }
  }
}
