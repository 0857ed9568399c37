// Demo driver for the identity verification core. The OCR engine, face
// embedder and camera are simulated here; the real application wires these
// seams to its actual services.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;

use xacthuc::models::{
    DocumentImage, DocumentKind, DocumentSide, FaceDescriptor, ImageSource, OcrResult, Profile,
    VerifyConfig,
};
use xacthuc::verification::{
    Camera, FaceEmbedder, MemoryStore, OcrEngine, OcrEngineProvider, VerificationFlow,
};
use xacthuc::VerifyError;

const SAMPLE_LICENSE_TEXT: &str = "\
CỘNG HÒA XÃ HỘI CHỦ NGHĨA VIỆT NAM
GIẤY PHÉP LÁI XE / DRIVER'S LICENSE
Số / No: 790123456789
Họ tên / Full name: NGUYEN VO ANH KHOA
Ngày sinh / Date of birth: 01/01/2000
Quốc tịch / Nationality: VIỆT NAM";

#[derive(Parser)]
#[command(
    name = "verify_demo",
    about = "Runs the identity verification flow end to end with simulated collaborators"
)]
struct Args {
    /// Profile name the document must match
    #[arg(long, default_value = "Nguyễn Võ Anh Khoa")]
    name: String,

    /// Text file standing in for the document's OCR output
    #[arg(long)]
    document_text: Option<PathBuf>,

    /// Simulate a live capture of a different person
    #[arg(long)]
    impostor: bool,
}

struct SimulatedOcr {
    text: String,
}

#[async_trait]
impl OcrEngine for SimulatedOcr {
    async fn recognize(&mut self, _image: &DocumentImage) -> Result<OcrResult, VerifyError> {
        Ok(OcrResult {
            text: self.text.clone(),
            confidence: 91.0,
        })
    }
}

struct SimulatedProvider {
    text: String,
}

impl OcrEngineProvider for SimulatedProvider {
    fn create(&self) -> Result<Box<dyn OcrEngine>, VerifyError> {
        Ok(Box::new(SimulatedOcr {
            text: self.text.clone(),
        }))
    }
}

/// Stands in for the face-embedding extractor: the payload's byte sum picks
/// a unit basis vector, so identical payloads land at distance zero and any
/// payload difference lands far apart.
struct SimulatedEmbedder;

#[async_trait]
impl FaceEmbedder for SimulatedEmbedder {
    async fn extract(&self, image: &[u8]) -> Result<FaceDescriptor, VerifyError> {
        if image.is_empty() {
            return Err(VerifyError::NoFaceDetected);
        }
        let bucket = image.iter().map(|b| *b as usize).sum::<usize>() % 8;
        let mut dims = vec![0.0f32; 8];
        dims[bucket] = 1.0;
        Ok(FaceDescriptor::new(dims))
    }
}

struct SimulatedCamera {
    frame: Vec<u8>,
}

#[async_trait]
impl Camera for SimulatedCamera {
    async fn acquire(&mut self) -> Result<(), VerifyError> {
        Ok(())
    }

    async fn capture_frame(&mut self) -> Result<Vec<u8>, VerifyError> {
        Ok(self.frame.clone())
    }

    fn release(&mut self) {}
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let document_text = match &args.document_text {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("Could not read {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => SAMPLE_LICENSE_TEXT.to_string(),
    };

    let license_front: Vec<u8> = document_text.clone().into_bytes();
    let live_frame = if args.impostor {
        // One extra byte shifts the simulated embedding to a far bucket.
        let mut frame = license_front.clone();
        frame.push(1);
        frame
    } else {
        license_front.clone()
    };

    let mut flow = VerificationFlow::new(
        Profile::new(args.name.clone(), true),
        VerifyConfig::default(),
        Box::new(SimulatedProvider {
            text: document_text,
        }),
        Box::new(SimulatedEmbedder),
        Box::new(SimulatedCamera { frame: live_frame }),
        MemoryStore::new(),
    );

    flow.select_kind(DocumentKind::DriverLicense)
        .expect("selection open at the documents step");
    for (kind, side, bytes) in [
        (DocumentKind::NationalId, DocumentSide::Front, b"id-front".to_vec()),
        (DocumentKind::NationalId, DocumentSide::Back, b"id-back".to_vec()),
        (DocumentKind::DriverLicense, DocumentSide::Front, license_front),
        (DocumentKind::DriverLicense, DocumentSide::Back, b"dl-back".to_vec()),
    ] {
        flow.upload_document(kind, side, bytes.into_image(kind))
            .expect("upload accepted at the documents step");
    }

    println!("\n===============================================");
    println!("      IDENTITY VERIFICATION DETAILED REPORT");
    println!("===============================================\n");
    println!("PROFILE NAME: {}", args.name);

    if let Err(err) = flow.advance_to_extract() {
        eprintln!("Cannot start extraction: {err}");
        std::process::exit(1);
    }

    match flow.run_extract().await {
        Ok(result) => {
            println!("\nDOCUMENT:");
            println!("  Detected Type:  {}", result.document_type);
            println!("  Title:          {}", result.document_title);
            println!("  Extracted Name: {}", result.extracted_name);
            println!("  OCR Confidence: {:.0}", result.confidence);
            println!("\n  1. Document Validation: PASSED");
        }
        Err(err) => {
            println!("\n  1. Document Validation: FAILED");
            println!("     {err}");
            print_result(false, None);
            return;
        }
    }

    match flow.run_verify().await {
        Ok(outcome) if outcome.is_match => {
            println!("  2. Face Verification:   PASSED (distance {:.3})", outcome.distance);
            print_result(flow.session().verified(), Some(outcome.distance));
        }
        Ok(outcome) => {
            println!("  2. Face Verification:   FAILED (distance {:.3})", outcome.distance);
            print_result(false, Some(outcome.distance));
        }
        Err(err) => {
            println!("  2. Face Verification:   FAILED");
            println!("     {err}");
            print_result(false, None);
        }
    }
}

fn print_result(verified: bool, distance: Option<f32>) {
    if let Some(distance) = distance {
        println!("\nFace distance for audit: {distance:.3}");
    }
    println!(
        "\nVerification result: {}",
        if verified { "VERIFIED" } else { "NOT VERIFIED" }
    );
}
