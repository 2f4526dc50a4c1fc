use covidx_core::{
    Answer, ErrorKind, HttpPredictionClient, ImageFile, PredictionService, Questionnaire,
    ServiceConfig, SubmitError, UploadState,
};
use mockito::{Matcher, Server};
use std::net::TcpListener;

const UNUSED: &str = "http://127.0.0.1:9/unused";

fn client_for(detection_url: &str, prediction_url: &str) -> HttpPredictionClient {
    HttpPredictionClient::new(&ServiceConfig {
        detection_url: detection_url.to_string(),
        prediction_url: prediction_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[test]
fn questionnaire_posts_json_answers_and_reads_verdict() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/predict-prediction")
        .match_header("content-type", "application/json")
        .match_body(r#"{"answer":{"breathing":"Yes","fever":"No"}}"#)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"prediction": 1, "confidence": 87.654}"#)
        .create();
    let client = client_for(UNUSED, &format!("{}/predict-prediction", server.url()));

    let mut questionnaire = Questionnaire::default();
    questionnaire.select_answer("breathing", Answer::Yes).unwrap();
    questionnaire.select_answer("fever", Answer::No).unwrap();
    questionnaire.next_page();
    let result = questionnaire.submit(&client).unwrap();

    mock.assert();
    assert_eq!(
        result.message(),
        "There is a 87.65% chance that you have COVID."
    );
    assert_eq!(questionnaire.result(), Some(&result));
}

#[test]
fn float_prediction_from_service_is_accepted() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/predict-prediction")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"prediction": 1.0, "confidence": 80.0}"#)
        .create();
    let client = client_for(UNUSED, &format!("{}/predict-prediction", server.url()));

    let mut questionnaire = Questionnaire::default();
    questionnaire.next_page();
    let result = questionnaire.submit(&client).unwrap();

    mock.assert();
    assert!(result.is_positive());
}

#[test]
fn upload_sends_multipart_file_field() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/predict")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file""#.to_string()),
            Matcher::Regex(r#"filename="chest.png""#.to_string()),
            Matcher::Regex("(?i)content-type: image/png".to_string()),
            Matcher::Regex("PNGDATA".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Prediction: No COVID"}"#)
        .create();
    let client = client_for(&format!("{}/predict", server.url()), UNUSED);

    let mut upload = UploadState::default();
    upload.select_file(ImageFile::new("chest.png", b"PNGDATA".to_vec()), ());
    let message = upload.submit(&client).unwrap();

    mock.assert();
    assert_eq!(message, "Prediction: No COVID");
    assert_eq!(upload.last_outcome(), Some(&Ok(message)));
}

#[test]
fn server_error_message_is_surfaced() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/predict")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "No selected file"}"#)
        .create();
    let client = client_for(&format!("{}/predict", server.url()), UNUSED);

    let err = client
        .detect(&ImageFile::new("", Vec::new()))
        .unwrap_err();

    mock.assert();
    assert_eq!(
        err,
        SubmitError::Server {
            status: 400,
            message: "No selected file".into()
        }
    );
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[test]
fn unexpected_body_is_malformed_response() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"label": "covid"}"#)
        .create();
    let client = client_for(&format!("{}/predict", server.url()), UNUSED);

    let err = client
        .detect(&ImageFile::new("a.jpg", vec![1, 2, 3]))
        .unwrap_err();

    mock.assert();
    assert!(matches!(err, SubmitError::MalformedResponse(_)));
}

#[test]
fn unreachable_service_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(UNUSED, &format!("http://{addr}/predict"));

    let mut questionnaire = Questionnaire::default();
    questionnaire.next_page();
    let err = questionnaire.submit(&client).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(questionnaire.last_outcome(), Some(&Err(err)));
    assert!(!questionnaire.is_submitting());
}
