use image::DynamicImage;
use tempfile::TempDir;

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_encode_decode_roundtrip() {
    let original_content = "Hello, world! This is a test for ezcode encode/decode roundtrip.";

    let image = ezcode::encode_as_image(original_content, 300).expect("Encoding failed");
    let result = ezcode::decode_image(&DynamicImage::ImageRgba8(image));

    let decoded = result.decoded().expect("Decoding failed");
    assert_eq!(decoded.text, original_content);
    assert_eq!(decoded.symbology, ezcode::Symbology::QrCode);
    assert_eq!(decoded.decode_type(), ezcode::DecodeType::Text);
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_utf8_roundtrip() {
    let original_content = "Grüße aus 東京 🚀";
    assert_eq!(
        ezcode::EncodeHints::for_contents(original_content).character_set,
        Some(ezcode::CharacterSet::Utf8)
    );

    let image = ezcode::encode_as_image(original_content, 400).expect("Encoding failed");
    let result = ezcode::decode_image(&DynamicImage::ImageRgba8(image));

    assert_eq!(result.text(), Some(original_content));
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_display_sized_code_is_downscaled_and_decoded() {
    let url = "https://example.com/scan?id=42";
    let display = ezcode::DisplaySize::new(1080, 1920);

    let image = ezcode::encode_for_display(url, display).expect("Encoding failed");
    assert_eq!(image.dimensions(), (945, 945));

    let image = DynamicImage::ImageRgba8(image);
    let scaled = ezcode::downscale_for_decode(&image);
    assert_eq!((scaled.width(), scaled.height()), (400, 400));

    let result = ezcode::decode_image(&image);
    let decoded = result.decoded().expect("Decoding failed");
    assert_eq!(decoded.text, url);
    assert_eq!(decoded.decode_type(), ezcode::DecodeType::Url);
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_saved_image_decodes_from_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("codes").join("mail.png");

    ezcode::encode_to_file("someone@example.org", 250, &path).expect("Encoding failed");
    assert!(path.exists());

    let result = ezcode::decode_file(&path, &ezcode::DecodeHints::default())
        .expect("Failed to read image");
    let decoded = result.decoded().expect("Decoding failed");
    assert_eq!(decoded.text, "someone@example.org");
    assert_eq!(decoded.decode_type(), ezcode::DecodeType::Email);
    assert!(result.handling_time_secs().parse::<f64>().is_ok());
}

#[test]
#[cfg(feature = "decode")]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("missing.png");

    assert!(ezcode::decode_file(&path, &ezcode::DecodeHints::default()).is_err());
}

#[test]
#[cfg(feature = "decode")]
fn test_blank_image_is_not_found() {
    let blank = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        640,
        480,
        image::Rgba([255, 255, 255, 255]),
    ));

    let result = ezcode::decode_image(&blank);
    assert!(matches!(result.outcome, Err(ezcode::ScanError::NotFound)));
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_qr_excluded_by_hints() {
    let image = ezcode::encode_as_image("12345", 200).expect("Encoding failed");
    let hints = ezcode::DecodeHints::with_formats([ezcode::Symbology::Ean13]);

    let result = ezcode::decode_image_with_hints(&DynamicImage::ImageRgba8(image), &hints);
    assert!(!result.is_found());
}

#[test]
#[cfg(all(feature = "encode", feature = "decode"))]
fn test_rgba_frame_decodes() {
    let image = ezcode::encode_as_image("frame", 160).expect("Encoding failed");
    let (width, height) = image.dimensions();

    let result =
        ezcode::decode_rgba(image.as_raw(), width, height, &ezcode::DecodeHints::default());
    assert_eq!(result.text(), Some("frame"));
}
