//! Pipeline scenarios against the scripted provider.

use std::sync::{Arc, Mutex};

use reelgen_models::{AspectRatio, ErrorKind, ProgressEvent, ReferenceImage};
use reelgen_pipeline::testing::{Attempt, ScriptedProvider, SCRIPTED_VIDEO_BYTES};
use reelgen_pipeline::{
    Cancellation, GenerationSubmission, NoopProgress, PipelineConfig, ProviderRequest,
    StaticCredentials, VideoPipeline,
};
use tokio_test::assert_err;

const RAIN_PROMPT: &str = "A person walking in rain";

fn pipeline_with(provider: Arc<ScriptedProvider>) -> VideoPipeline {
    VideoPipeline::new(
        PipelineConfig::default(),
        provider,
        Arc::new(StaticCredentials::new("test-key")),
    )
}

fn jpeg(size: usize, fill: u8) -> ReferenceImage {
    ReferenceImage::new(vec![fill; size], "image/jpeg")
}

#[tokio::test]
async fn zero_images_never_reach_the_provider() {
    let provider = Arc::new(ScriptedProvider::succeeding());
    let pipeline = pipeline_with(provider.clone());

    let submission = GenerationSubmission::with_images(RAIN_PROMPT, vec![], AspectRatio::Portrait);
    let err = assert_err!(
        pipeline
            .generate(submission, &NoopProgress, Cancellation::none())
            .await
    );

    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert_eq!(err.message, "No character image uploaded");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn single_image_portrait_generation() {
    let provider = Arc::new(ScriptedProvider::succeeding());
    let pipeline = pipeline_with(provider.clone());
    let events = Mutex::new(Vec::new());
    let sink = |e: ProgressEvent| events.lock().unwrap().push(e);

    let submission = GenerationSubmission::with_images(
        RAIN_PROMPT,
        vec![jpeg(2 * 1024 * 1024, 0xAB)],
        AspectRatio::Portrait,
    );
    let artifact = pipeline
        .generate(submission, &sink, Cancellation::none())
        .await
        .unwrap();

    assert_eq!(artifact.bytes, SCRIPTED_VIDEO_BYTES);
    assert_eq!(provider.submit_count(), 1);
    assert_eq!(provider.poll_count(), 2);

    let submitted = provider.submitted();
    let ProviderRequest::ImageToVideo(request) = &submitted[0] else {
        panic!("expected an image-to-video request");
    };
    assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(request.image.mime_type, "image/jpeg");
    assert!(request.prompt.contains(RAIN_PROMPT));
    assert!(request.prompt.contains("of a person"));

    let percents: Vec<u8> = events.lock().unwrap().iter().map(|e| e.percent).collect();
    assert_eq!(percents, vec![5, 15, 20, 25, 95, 100]);
    assert!(!percents.contains(&10));
}

#[tokio::test(start_paused = true)]
async fn three_images_use_asset_references_in_order() {
    let provider = Arc::new(ScriptedProvider::succeeding());
    let pipeline = pipeline_with(provider.clone());

    let images = vec![
        ReferenceImage::new(vec![1u8; 32], "image/png"),
        ReferenceImage::new(vec![2u8; 32], "image/jpeg"),
        ReferenceImage::new(vec![3u8; 32], "image/webp"),
    ];
    let submission =
        GenerationSubmission::with_images("Three friends dancing", images, AspectRatio::Portrait)
            .identity_strict(true);

    pipeline
        .generate(submission, &NoopProgress, Cancellation::none())
        .await
        .unwrap();

    let submitted = provider.submitted();
    let ProviderRequest::AssetReferenced(request) = &submitted[0] else {
        panic!("expected an asset-referenced request");
    };
    let mimes: Vec<&str> = request
        .reference_images
        .iter()
        .map(|asset| asset.image.mime_type.as_str())
        .collect();
    assert_eq!(mimes, vec!["image/png", "image/jpeg", "image/webp"]);
    assert!(request.prompt.contains("featuring 3 distinct people"));
    assert!(request.prompt.contains("Prioritize a vertical composition"));
    assert!(request.prompt.starts_with("Use the uploaded reference images."));
}

#[tokio::test(start_paused = true)]
async fn timeout_is_retried_exactly_once() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Attempt::never_completes(),
        Attempt::video_after(1, "https://files.example.com/retry.mp4"),
    ]));
    let pipeline = pipeline_with(provider.clone());
    let events = Mutex::new(Vec::new());
    let sink = |e: ProgressEvent| events.lock().unwrap().push(e);

    let submission =
        GenerationSubmission::with_images(RAIN_PROMPT, vec![jpeg(1024, 1)], AspectRatio::Landscape);
    let artifact = pipeline
        .generate(submission, &sink, Cancellation::none())
        .await
        .unwrap();

    assert_eq!(artifact.source_uri, "https://files.example.com/retry.mp4");
    assert_eq!(provider.submit_count(), 2);
    let retries = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.percent == 10 && e.stage == "Server was busy. Retrying your request...")
        .count();
    assert_eq!(retries, 1);
}

#[tokio::test(start_paused = true)]
async fn second_timeout_is_terminal() {
    let provider = Arc::new(ScriptedProvider::new(vec![Attempt::never_completes()]));
    let pipeline = pipeline_with(provider.clone());

    let submission =
        GenerationSubmission::with_images(RAIN_PROMPT, vec![jpeg(1024, 1)], AspectRatio::Square);
    let err = pipeline
        .generate(submission, &NoopProgress, Cancellation::none())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::TimedOut);
    assert_eq!(
        err.message,
        "Server busy: The video generation request timed out. Please try again in a few moments."
    );
    assert_eq!(provider.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn moderation_failure_is_not_retried() {
    let provider = Arc::new(ScriptedProvider::new(vec![Attempt::job_error_after(
        2,
        "Video blocked by moderation",
    )]));
    let pipeline = pipeline_with(provider.clone());

    let submission =
        GenerationSubmission::with_images(RAIN_PROMPT, vec![jpeg(1024, 1)], AspectRatio::Portrait);
    let err = pipeline
        .generate(submission, &NoopProgress, Cancellation::none())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SafetyPolicyRejected);
    assert_eq!(provider.submit_count(), 1);
    assert_eq!(provider.fetch_count(), 0);
}
