//! Structured prompt composition for the video model.
//!
//! The model has no separate identity-lock parameter, so the density of
//! the natural-language instructions built here is what biases it toward
//! keeping the faces from the reference images.

use reelgen_models::AspectRatio;

/// Length of the generated clip, as stated to the model.
pub const CLIP_DURATION_QUALIFIER: &str = "A 4-second cinematic video";

const BASE_STYLE: &str =
    "Ultra realistic, 8k, cinematic lighting, smooth motion, shallow depth of field, high detail.";

const MULTI_PORTRAIT_COMPOSITION: &str = " Prioritize a vertical composition with a depth layout to fit characters naturally. Use dynamic camera motion (like a pan or tilt) to enhance the scene.";

const CONSTRAINTS: &str =
    "No violence, nudity, or political content. Preserve facial identity accurately.";

/// Strict facial identity directives prepended when identity lock is on.
pub const IDENTITY_PRESERVATION_BLOCK: &str = "Use the uploaded reference images.
Maintain exact facial structure, eye shape, eyebrow thickness, nose shape, lip shape, jawline, skin tone, and hair style from the reference photos.
Do not modify identity.
No face distortion.
No different person.
Only change pose and camera angle.
Maintain strict facial consistency with the provided reference images. Preserve exact facial structure, eye shape, eyebrow thickness, nose shape, lip shape, jawline, skin tone, and hair density. Do not alter core facial features. Only adapt pose, lighting, and expression. Ultra-realistic skin texture. No face distortion. No identity drift.";

/// Build the instruction string sent to the model.
pub fn compose(
    user_prompt: &str,
    image_count: usize,
    aspect_ratio: AspectRatio,
    identity_strict: bool,
) -> String {
    let multi = image_count > 1;

    let mut style = BASE_STYLE.to_string();
    if multi && aspect_ratio.is_portrait() {
        style.push_str(MULTI_PORTRAIT_COMPOSITION);
    }

    let subject = if multi {
        format!(
            "featuring {} distinct people based on the reference images",
            image_count
        )
    } else {
        "of a person".to_string()
    };

    let body = format!(
        "{CLIP_DURATION_QUALIFIER} {subject}. Scene: {scene}. Style: {style} Format: {ratio}. {CONSTRAINTS}",
        scene = user_prompt.trim().trim_end_matches('.'),
        ratio = aspect_ratio,
    );

    if identity_strict {
        format!("{IDENTITY_PRESERVATION_BLOCK}\n\n{body}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_is_deterministic() {
        let a = compose("A dance on the beach", 2, AspectRatio::Portrait, true);
        let b = compose("A dance on the beach", 2, AspectRatio::Portrait, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_subject() {
        let prompt = compose("A person walking in rain", 1, AspectRatio::Landscape, false);
        assert_eq!(
            prompt,
            "A 4-second cinematic video of a person. Scene: A person walking in rain. \
             Style: Ultra realistic, 8k, cinematic lighting, smooth motion, shallow depth of field, high detail. \
             Format: 16:9. No violence, nudity, or political content. Preserve facial identity accurately."
        );
    }

    #[test]
    fn test_multi_subject_clause() {
        let prompt = compose("Friends at a cafe", 3, AspectRatio::Square, false);
        assert!(prompt.contains("featuring 3 distinct people"));
        assert!(!prompt.contains("of a person"));
        assert!(!prompt.contains("vertical composition"));
    }

    #[test]
    fn test_multi_portrait_gets_composition_hint() {
        let prompt = compose("Friends at a cafe", 2, AspectRatio::Portrait, false);
        assert!(prompt.contains("Prioritize a vertical composition"));
    }

    #[test]
    fn test_single_portrait_has_no_composition_hint() {
        let prompt = compose("Solo walk", 1, AspectRatio::Portrait, false);
        assert!(!prompt.contains("vertical composition"));
    }

    #[test]
    fn test_identity_block_precedes_scene() {
        let prompt = compose("A person walking in rain", 1, AspectRatio::Portrait, true);
        assert!(prompt.starts_with(IDENTITY_PRESERVATION_BLOCK));

        let block_at = prompt.find("No identity drift.").unwrap();
        let scene_at = prompt.find("A person walking in rain").unwrap();
        assert!(block_at < scene_at);
    }

    #[test]
    fn test_identity_block_absent_when_disabled() {
        let prompt = compose("A person walking in rain", 1, AspectRatio::Portrait, false);
        assert!(!prompt.contains("No identity drift."));
    }

    #[test]
    fn test_identity_block_follows_flag_not_image_count() {
        let relaxed = compose("Friends at a cafe", 3, AspectRatio::Square, false);
        assert!(!relaxed.contains("No identity drift."));

        let strict = compose("Friends at a cafe", 3, AspectRatio::Square, true);
        assert!(strict.starts_with(IDENTITY_PRESERVATION_BLOCK));
    }
}
