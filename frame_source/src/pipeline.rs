//! A gstreamer `uridecodebin ! videoconvert ! appsink` pipeline that hands
//! out decoded RGB frames one at a time.

use gstreamer::prelude::*;
use gstreamer::{ClockTime, CoreError, MessageView, StateChangeSuccess};
use gstreamer_video::VideoFrameExt;
use image::{DynamicImage, RgbImage};
use moment_finder::DecodedFrame;

use crate::error::DecodeError;

/// One decoded RGB frame pulled from the pipeline, along with the
/// presentation timestamp gstreamer attached to its buffer.
pub struct GstFrame {
    image: DynamicImage,
    timestamp_seconds: f64,
}

impl DecodedFrame for GstFrame {
    fn timestamp_seconds(&self) -> f64 {
        self.timestamp_seconds
    }

    fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// A single-use, forward-only source of decoded frames for one opened
/// video. Dropping it tears down the gstreamer pipeline.
pub struct GstFrameSource {
    pipeline: gstreamer::Pipeline,
    fused: bool,
    duration_seconds: Option<f64>,
}

impl GstFrameSource {
    pub(crate) fn open(uri: &str, duration_seconds: Option<f64>) -> Result<Self, DecodeError> {
        let pipeline_desc =
            format!("uridecodebin uri=\"{uri}\" buffer-size=1 ! videoconvert ! appsink name=sink");

        let pipeline = gstreamer::parse::launch(&pipeline_desc)
            .map_err(DecodeError::Gstreamer)?
            .downcast::<gstreamer::Pipeline>()
            .expect("parse::launch of a pipeline description yields a Pipeline");

        let appsink = pipeline
            .by_name("sink")
            .expect("pipeline description names the sink element \"sink\"")
            .downcast::<gstreamer_app::AppSink>()
            .expect("element named \"sink\" is an appsink");

        appsink.set_property("sync", false);
        appsink.set_max_buffers(1);
        appsink.set_drop(false);
        appsink.set_caps(Some(
            &gstreamer::Caps::builder("video/x-raw")
                .field("format", gstreamer_video::VideoFormat::Rgb.to_str())
                .build(),
        ));

        let source = Self {
            pipeline,
            fused: false,
            duration_seconds,
        };

        change_state_blocking(&source.pipeline, gstreamer::State::Paused)?;
        change_state_blocking(&source.pipeline, gstreamer::State::Playing)?;

        Ok(source)
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    fn try_find_error(&self) -> Option<glib::Error> {
        let bus = self.pipeline.bus().expect("pipeline always has a bus");
        bus.pop_filtered(&[gstreamer::MessageType::Error, gstreamer::MessageType::Warning])
            .map(|msg| match msg.view() {
                MessageView::Error(e) => e.error(),
                MessageView::Warning(w) => w.error(),
                _ => unreachable!("filtered to only Error/Warning messages"),
            })
    }

    fn next_sample(&mut self) -> Option<Result<gstreamer::Sample, DecodeError>> {
        if self.fused {
            return None;
        }

        if let Some(error) = self.try_find_error() {
            return Some(Err(DecodeError::Gstreamer(error)));
        }

        let appsink = self
            .pipeline
            .by_name("sink")
            .expect("sink element present for the lifetime of the pipeline")
            .downcast::<gstreamer_app::AppSink>()
            .expect("element named \"sink\" is an appsink");

        let timeout = 30 * ClockTime::SECOND;
        match appsink.try_pull_sample(timeout) {
            Some(sample) => Some(Ok(sample)),
            None => {
                self.fused = true;
                let result = match self.try_find_error() {
                    Some(error) => Some(Err(DecodeError::Gstreamer(error))),
                    None if !appsink.is_eos() => Some(Err(DecodeError::StateChange(
                        "gstreamer timed out waiting for a frame".to_owned(),
                    ))),
                    None => None,
                };
                let _ = change_state_blocking(&self.pipeline, gstreamer::State::Null);
                result
            }
        }
    }
}

impl Drop for GstFrameSource {
    fn drop(&mut self) {
        let _ = change_state_blocking(&self.pipeline, gstreamer::State::Null);
    }
}

impl moment_finder::VideoFrameSource for GstFrameSource {
    type Frame = GstFrame;
    type Error = DecodeError;

    fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    fn next_frame(&mut self) -> Option<Result<Self::Frame, Self::Error>> {
        self.next_sample().map(|res| res.and_then(sample_to_frame))
    }
}

fn sample_to_frame(sample: gstreamer::Sample) -> Result<GstFrame, DecodeError> {
    let caps = sample.caps().ok_or(DecodeError::MissingCaps)?;
    let info = gstreamer_video::VideoInfo::from_caps(caps)
        .map_err(|e| DecodeError::FrameMap(e.to_string()))?;

    let timestamp_seconds = sample
        .buffer()
        .and_then(|b| b.pts())
        .map(|pts| pts.nseconds() as f64 / 1_000_000_000.0)
        .unwrap_or(0.0);

    let buffer = sample
        .buffer_owned()
        .ok_or_else(|| DecodeError::FrameMap("sample had no buffer".to_owned()))?;

    let frame = gstreamer_video::VideoFrame::from_buffer_readable(buffer, &info)
        .map_err(|_| DecodeError::FrameMap("failed to map buffer readable".to_owned()))?;

    let width = frame.width();
    let height = frame.height();
    let stride = frame.plane_stride()[0] as usize;
    let row_bytes = width as usize * 3;
    let plane = frame
        .plane_data(0)
        .map_err(|_| DecodeError::FrameMap("missing RGB plane".to_owned()))?;

    let mut packed = vec![0u8; row_bytes * height as usize];
    for row in 0..height as usize {
        let src = row * stride;
        let dst = row * row_bytes;
        packed[dst..dst + row_bytes].copy_from_slice(&plane[src..src + row_bytes]);
    }

    let image = RgbImage::from_raw(width, height, packed)
        .ok_or_else(|| DecodeError::FrameMap("frame buffer size mismatch".to_owned()))?;

    Ok(GstFrame {
        image: DynamicImage::ImageRgb8(image),
        timestamp_seconds,
    })
}

fn change_state_blocking(
    pipeline: &gstreamer::Pipeline,
    new_state: gstreamer::State,
) -> Result<(), DecodeError> {
    let timeout = 10 * ClockTime::SECOND;

    match pipeline.set_state(new_state) {
        Ok(StateChangeSuccess::Success | StateChangeSuccess::NoPreroll) => Ok(()),
        Ok(StateChangeSuccess::Async) => {
            let (result, _curr, _pending) = pipeline.state(timeout);
            match result {
                Ok(StateChangeSuccess::Success | StateChangeSuccess::NoPreroll) => Ok(()),
                _ => Err(DecodeError::StateChange(
                    "timed out changing pipeline state".to_owned(),
                )),
            }
        }
        Err(_) => {
            let bus = pipeline.bus().expect("pipeline always has a bus");
            let error = bus
                .pop_filtered(&[gstreamer::MessageType::Error, gstreamer::MessageType::Warning])
                .map(|msg| match msg.view() {
                    MessageView::Error(e) => e.error(),
                    MessageView::Warning(w) => w.error(),
                    _ => unreachable!("filtered to only Error/Warning messages"),
                })
                .unwrap_or_else(|| glib::Error::new(CoreError::TooLazy, "gstreamer state change error"));
            Err(DecodeError::Gstreamer(error))
        }
    }
}
