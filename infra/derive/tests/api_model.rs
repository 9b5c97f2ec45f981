use fhub_derive::api_model;

#[api_model(request)]
pub struct QuoteRequest {
    pub weight_kg: f64,
    pub shipping_mode: String,
}

#[api_model(request, lenient)]
pub struct LooseRequest {
    pub note: Option<String>,
}

#[api_model(response)]
pub struct TrackingView {
    pub tracking_number: String,
    pub last_update: Option<String>,
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct Echo {
    pub customer_id: String,
}

#[test]
fn request_bodies_read_camel_case_strictly() {
    let req: QuoteRequest =
        serde_json::from_str(r#"{"weightKg":2.5,"shippingMode":"air"}"#).unwrap();
    assert!((req.weight_kg - 2.5).abs() < f64::EPSILON);
    assert_eq!(req.shipping_mode, "air");

    let err = serde_json::from_str::<QuoteRequest>(r#"{"weightKg":1,"shippingMode":"sea","x":1}"#);
    assert!(err.is_err());
}

#[test]
fn lenient_requests_ignore_extra_fields() {
    let ok = serde_json::from_str::<LooseRequest>(r#"{"note":"fragile","extra":true}"#).unwrap();
    assert_eq!(ok.note.as_deref(), Some("fragile"));
}

#[test]
fn responses_write_camel_case() {
    let view = TrackingView { tracking_number: "BP7K2M9QXA".to_owned(), last_update: None };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["trackingNumber"], "BP7K2M9QXA");
    assert!(json["lastUpdate"].is_null());
}

#[test]
fn two_way_models_keep_their_own_derives() {
    let echo = Echo { customer_id: "JD482913".to_owned() };
    let json = serde_json::to_string(&echo).unwrap();
    assert_eq!(json, r#"{"customerId":"JD482913"}"#);
    assert_eq!(serde_json::from_str::<Echo>(&json).unwrap(), echo);
}
