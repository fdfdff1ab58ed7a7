use crate::generator::naming::operations::{compute_field_name, generate_operation_id, response_type_name};

#[test]
fn test_declared_operation_id_wins() {
  assert_eq!(compute_field_name("GET", "/items/{id}", Some("getItem")), "getItem");
  assert_eq!(compute_field_name("GET", "/items/{id}", Some("get-item")), "getItem");
}

#[test]
fn test_generated_operation_ids() {
  assert_eq!(generate_operation_id("GET", "/pets"), "getPets");
  assert_eq!(generate_operation_id("GET", "/pets/{petId}"), "getPetsByPetId");
  assert_eq!(generate_operation_id("GET", "/store/inventory-items"), "getStoreInventoryItems");
  assert_eq!(generate_operation_id("GET", "/"), "get");
  assert_eq!(compute_field_name("GET", "/pets/{id}", None), "getPetsById");
}

#[test]
fn test_response_type_names() {
  assert_eq!(response_type_name("/items/{id}"), "ItemsId");
  assert_eq!(response_type_name("/pets"), "Pets");
  assert_eq!(response_type_name("/v1/users/{user_id}/posts"), "V1UsersUserIdPosts");
  assert_eq!(response_type_name("/"), "Root");
}
