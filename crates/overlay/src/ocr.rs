//! Background OCR request

use crate::OverlayResult;
use capture::{OcrInformation, OcrProvider, ProviderError, ProviderResult};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use image::RgbaImage;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Outcome of polling a request
#[derive(Debug)]
pub enum OcrPoll {
    Pending,
    Ready(OcrInformation),
    Failed(ProviderError),
}

/// OCR running on a worker thread
///
/// The result is picked up with [`OcrRequest::poll`] on the overlay thread.
/// Dropping the request drops the receiver; a late result is then discarded
/// by the worker.
pub struct OcrRequest {
    receiver: Receiver<ProviderResult<OcrInformation>>,
    started: Instant,
}

impl OcrRequest {
    pub fn spawn(provider: Arc<dyn OcrProvider>, image: Arc<RgbaImage>) -> OverlayResult<Self> {
        let (result_tx, result_rx) = bounded(1);

        thread::Builder::new()
            .name("loupe-ocr".into())
            .spawn(move || {
                let result = provider.do_ocr(&image);
                if result_tx.send(result).is_err() {
                    log::debug!("OCR result discarded, overlay already closed");
                }
            })?;

        Ok(Self {
            receiver: result_rx,
            started: Instant::now(),
        })
    }

    /// Non-blocking check for the worker's result
    pub fn poll(&self) -> OcrPoll {
        match self.receiver.try_recv() {
            Ok(Ok(info)) => {
                log::debug!(
                    "OCR finished in {}ms, {} lines",
                    self.started.elapsed().as_millis(),
                    info.lines.len()
                );
                OcrPoll::Ready(info)
            }
            Ok(Err(e)) => OcrPoll::Failed(e),
            Err(TryRecvError::Empty) => OcrPoll::Pending,
            Err(TryRecvError::Disconnected) => OcrPoll::Failed(ProviderError::Failed(
                "OCR worker exited without a result".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{OcrLine, OcrWord, Rect};
    use crossbeam_channel::Sender;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct GatedOcr {
        gate: Mutex<Option<Receiver<()>>>,
    }

    impl OcrProvider for GatedOcr {
        fn do_ocr(&self, _image: &RgbaImage) -> ProviderResult<OcrInformation> {
            if let Some(gate) = self.gate.lock().take() {
                let _ = gate.recv();
            }
            Ok(OcrInformation {
                lines: vec![OcrLine {
                    words: vec![OcrWord {
                        text: "gate".into(),
                        bounds: Rect::new(0, 0, 10, 10),
                    }],
                }],
            })
        }
    }

    struct BrokenOcr;

    impl OcrProvider for BrokenOcr {
        fn do_ocr(&self, _image: &RgbaImage) -> ProviderResult<OcrInformation> {
            Err(ProviderError::Failed("engine crashed".into()))
        }
    }

    fn wait_for(request: &OcrRequest) -> OcrPoll {
        for _ in 0..500 {
            match request.poll() {
                OcrPoll::Pending => thread::sleep(Duration::from_millis(2)),
                other => return other,
            }
        }
        OcrPoll::Pending
    }

    fn gated() -> (Arc<GatedOcr>, Sender<()>) {
        let (open_tx, open_rx) = bounded(1);
        let provider = Arc::new(GatedOcr {
            gate: Mutex::new(Some(open_rx)),
        });
        (provider, open_tx)
    }

    #[test]
    fn result_arrives_after_worker_finishes() {
        let (provider, open) = gated();
        let request = OcrRequest::spawn(provider, Arc::new(RgbaImage::new(4, 4))).unwrap();
        assert!(matches!(request.poll(), OcrPoll::Pending));

        open.send(()).unwrap();
        match wait_for(&request) {
            OcrPoll::Ready(info) => assert_eq!(info.text(), "gate"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn provider_error_is_reported() {
        let image = Arc::new(RgbaImage::new(4, 4));
        let request = OcrRequest::spawn(Arc::new(BrokenOcr), image).unwrap();
        assert!(matches!(wait_for(&request), OcrPoll::Failed(_)));
    }

    #[test]
    fn dropping_request_discards_late_result() {
        let (provider, open) = gated();
        let request = OcrRequest::spawn(provider, Arc::new(RgbaImage::new(4, 4))).unwrap();
        drop(request);
        open.send(()).unwrap();
    }
}
