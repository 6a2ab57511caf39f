use std::path::Path;

use villager_odds::data::Catalog;
use villager_odds::server::routes::route_request;
use villager_odds::server::AppState;

fn state() -> AppState {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("villagers_small.csv");
    AppState::new(Catalog::from_path(path).expect("fixture catalog should load"))
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_reports_catalog_size() {
    let response = route_request(&state(), "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");

    let payload = json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["villagers"], 7);
    assert_eq!(payload["species"], 4);
}

#[test]
fn index_serves_the_form() {
    let response = route_request(&state(), "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("id=\"villager\""));
    assert!(response.body.contains("/api/estimate"));
}

#[test]
fn villagers_endpoint_lists_catalog_in_order() {
    let response = route_request(&state(), "GET", "/api/villagers", "");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    let villagers = payload["villagers"].as_array().expect("villagers should be an array");
    assert_eq!(villagers.len(), 7);
    assert_eq!(villagers[0]["name"], "Raymond");
    assert_eq!(villagers[0]["species"], "Cat");
    assert_eq!(villagers[0]["personality"], "Smug");
}

#[test]
fn villagers_endpoint_filters_by_species_ignoring_case() {
    let response = route_request(&state(), "GET", "/api/villagers?species=squirrel", "");
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    let names: Vec<&str> = payload["villagers"]
        .as_array()
        .expect("villagers should be an array")
        .iter()
        .filter_map(|v| v["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Marshal", "Poppy"]);
}

#[test]
fn species_endpoint_counts_members() {
    let response = route_request(&state(), "GET", "/api/species", "");
    let payload = json(&response.body);
    let species = payload["species"].as_array().expect("species should be an array");
    assert_eq!(species.len(), 4);
    assert_eq!(species[0]["species"], "Cat");
    assert_eq!(species[0]["villagers"], 3);
}

#[test]
fn estimate_endpoint_returns_message_and_series() {
    let body = r#"{"villager":"raymond","tickets":10,"same_species":0}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["villager"], "Raymond");
    assert_eq!(payload["species"], "Cat");
    assert_eq!(payload["species_total"], 4);
    assert_eq!(payload["villagers_in_species"], 3);

    let p = payload["single_attempt_probability"].as_f64().expect("probability");
    assert!((p - 1.0 / 12.0).abs() < 1e-12);
    let total = payload["tickets_probability"].as_f64().expect("tickets probability");
    assert!((total - (1.0 - (11.0_f64 / 12.0).powi(11))).abs() < 1e-9);

    let message = payload["message"].as_str().expect("message");
    assert!(message.contains("in a single attempt is: 8.33%"));
    assert!(message.contains("with 10 Nook Mile Tickets is: "));

    let series = payload["series"].as_array().expect("series should be an array");
    assert_eq!(series.len(), 9);
    assert_eq!(series[0]["tickets"], 1);
    assert_eq!(series[8]["tickets"], 9);
    assert_eq!(payload["chart"]["x_axis"], "Nook Mile Tickets");
    assert_eq!(payload["notes"].as_array().map(Vec::len), Some(0));
}

#[test]
fn estimate_endpoint_single_ticket_has_empty_series() {
    let body = r#"{"villager":"Fang","tickets":1,"same_species":0}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(
        payload["message"],
        "The probability of finding Fang with 1 Nook Mile Ticket is: 25.00%"
    );
    assert_eq!(payload["series"].as_array().map(Vec::len), Some(0));
}

#[test]
fn estimate_endpoint_notes_clamped_held_count() {
    let body = r#"{"villager":"Sherb","tickets":3,"same_species":2}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["held_clamped"], true);
    assert_eq!(payload["notes"].as_array().map(Vec::len), Some(1));
}

#[test]
fn estimate_endpoint_unknown_villager_is_not_found() {
    let body = r#"{"villager":"Zzzznotreal","tickets":5,"same_species":0}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 404);

    let payload = json(&response.body);
    assert_eq!(payload["status"], "error");
    assert_eq!(
        payload["message"],
        "Villager 'Zzzznotreal' not found in the dataset."
    );
    assert_eq!(payload["series"].as_array().map(Vec::len), Some(0));
}

#[test]
fn estimate_endpoint_rejects_invalid_payload() {
    let response = route_request(&state(), "POST", "/api/estimate", "{bad json}");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid request body"));
}

#[test]
fn estimate_validation_error_lists_fields() {
    let body = r#"{"villager":"","tickets":0,"same_species":11}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 400);

    let payload = json(&response.body);
    assert_eq!(payload["status"], "error");
    assert_eq!(
        payload["message"],
        "Please select a villager, enter a valid number of attempts, and enter a valid number of villagers of the same species."
    );

    let errors = payload["errors"].as_array().expect("errors should be array");
    for field in ["villager", "tickets", "same_species"] {
        assert!(
            errors.iter().any(|error| {
                error["field"] == field
                    && error["messages"]
                        .as_array()
                        .is_some_and(|messages| !messages.is_empty())
            }),
            "{field} validation error should be present"
        );
    }
    assert_eq!(payload["series"].as_array().map(Vec::len), Some(0));
}

#[test]
fn estimate_validation_treats_missing_fields_as_invalid() {
    let response = route_request(&state(), "POST", "/api/estimate", r#"{"villager":"Bob"}"#);
    assert_eq!(response.status_code, 400);

    let payload = json(&response.body);
    let fields: Vec<&str> = payload["errors"]
        .as_array()
        .expect("errors should be array")
        .iter()
        .filter_map(|error| error["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["tickets", "same_species"]);
}

#[test]
fn estimate_rejects_fractional_tickets_as_a_field_error() {
    let body = r#"{"villager":"Bob","tickets":2.5,"same_species":"two"}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 400);

    let payload = json(&response.body);
    assert_eq!(
        payload["message"],
        "Please select a villager, enter a valid number of attempts, and enter a valid number of villagers of the same species."
    );
    let errors = payload["errors"].as_array().expect("errors should be array");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["field"], "tickets");
    assert_eq!(errors[0]["messages"][0], "must be a whole number");
    assert_eq!(errors[1]["field"], "same_species");
    assert_eq!(errors[1]["messages"][0], "must be a number");
    assert_eq!(payload["series"].as_array().map(Vec::len), Some(0));
}

#[test]
fn estimate_accepts_ticket_counts_beyond_the_chart_limit() {
    let body = r#"{"villager":"Fang","tickets":20000,"same_species":0}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 200);

    let payload = json(&response.body);
    assert_eq!(payload["tickets"], 20000);
    let total = payload["tickets_probability"].as_f64().expect("numeric probability");
    let expected = 1.0 - (1.0_f64 - 0.25).powi(20001);
    assert!((total - expected).abs() < 1e-12);

    let series = payload["series"].as_array().expect("series should be array");
    assert!(series.len() <= 10_000);
    assert_eq!(series.last().map(|point| &point["tickets"]), Some(&serde_json::json!(19999)));
    assert_eq!(payload["series_sampled"], true);
    let notes = payload["notes"].as_array().expect("notes should be array");
    assert!(notes
        .iter()
        .any(|note| note.as_str().is_some_and(|note| note.contains("sampled"))));
}

#[test]
fn padded_villager_name_is_not_found() {
    let body = r#"{"villager":" Raymond ","tickets":5,"same_species":0}"#;
    let response = route_request(&state(), "POST", "/api/estimate", body);
    assert_eq!(response.status_code, 404);
    assert_eq!(
        json(&response.body)["message"],
        "Villager ' Raymond ' not found in the dataset."
    );
}

#[test]
fn unknown_route_is_not_found() {
    let response = route_request(&state(), "GET", "/api/optimize", "");
    assert_eq!(response.status_code, 404);
    assert!(response.body.contains("Route not found"));

    let response = route_request(&state(), "GET", "/api/estimate", "");
    assert_eq!(response.status_code, 404);
}
