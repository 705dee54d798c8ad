//! On-disk document shape for every entity kind.

use quire_types::{
    Collection, Entity, EntityMut, Environment, Kind, Preferences, Request, RequestType,
    Workspace,
};
use rstest::rstest;

fn encode(mut entity: Entity) -> String {
    let bytes = entity.view_mut().to_yaml().expect("encode");
    String::from_utf8(bytes).expect("utf8")
}

#[rstest]
#[case::workspace(Entity::from(Workspace::new("w1", "Main")), "Workspace")]
#[case::collection(Entity::from(Collection::new("c1", "Orders")), "Collection")]
#[case::environment(Entity::from(Environment::new("e1", "dev")), "Environment")]
#[case::request(Entity::from(Request::new_http("r1", "List")), "Request")]
fn documents_carry_header(#[case] entity: Entity, #[case] kind: &str) {
    let text = encode(entity);

    assert!(text.contains("apiVersion: v1"), "{text}");
    assert!(text.contains(&format!("kind: {kind}")), "{text}");
    assert!(text.contains("metadata:"), "{text}");
}

#[test]
fn old_request_without_type_decodes() {
    let doc = br#"
apiVersion: v1
kind: Request
metadata:
  id: r-legacy
  name: Legacy
spec:
  http:
    method: POST
    url: https://api.example.com/orders
"#;

    let entity = Entity::from_yaml(Kind::Request, doc).expect("decode");
    let request = entity.into_request().expect("request");

    assert_eq!(request.spec.request_type, None);
    assert_eq!(request.infer_type(), Some(RequestType::Http));
    let url = request.spec.http.as_ref().map(|h| h.url.as_str());
    assert_eq!(url, Some("https://api.example.com/orders"));
}

#[test]
fn environment_values_round_trip() {
    let mut env = Environment::new("e1", "staging");
    env.set_value("API_URL", "https://staging.example.com");
    env.set_value("API_URL", "https://staging2.example.com");

    let bytes = EntityMut::from(&mut env).to_yaml().expect("encode");
    let decoded = Entity::from_yaml(Kind::Environment, &bytes)
        .expect("decode")
        .into_environment()
        .expect("environment");

    assert_eq!(decoded.spec.values.len(), 1);
    assert_eq!(decoded.value("API_URL"), Some("https://staging2.example.com"));
    assert_eq!(decoded, env);
}

#[test]
fn malformed_document_is_an_error() {
    let result = Entity::from_yaml(Kind::Workspace, b"metadata: [not, a, map]");
    assert!(result.is_err());
}

#[test]
fn preferences_default_to_dark_mode() {
    let prefs: Preferences = serde_yaml_ng::from_str("apiVersion: v1\n").expect("decode");
    assert!(prefs.spec.dark_mode);
    assert_eq!(prefs, Preferences::default());
}
