//! Image upload state machine: Await-Info -> Accumulate -> Finalize.

use crate::pb::upload_image_request::Data;
use crate::pb::{ImageInfo, UploadImageRequest};

use super::error::ServiceError;

/// Largest image accepted, in bytes.
pub const MAX_IMAGE_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    /// Waiting for the header naming the laptop and image type.
    AwaitInfo,
    /// Collecting chunks.
    Accumulate { info: ImageInfo, data: Vec<u8> },
    /// The image was handed off (or the upload failed); no more input is accepted.
    Finalized,
}

/// Assembles one uploaded image from its inbound messages.
///
/// Any error moves the upload to `Finalized`; a failed upload never yields
/// a partial image.
#[derive(Debug)]
pub struct ImageUpload {
    state: UploadState,
    max_size: usize,
}

impl ImageUpload {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: UploadState::AwaitInfo,
            max_size,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Header of the upload, once received.
    pub fn info(&self) -> Option<&ImageInfo> {
        match &self.state {
            UploadState::Accumulate { info, .. } => Some(info),
            _ => None,
        }
    }

    /// Bytes accumulated so far.
    pub fn size(&self) -> usize {
        match &self.state {
            UploadState::Accumulate { data, .. } => data.len(),
            _ => 0,
        }
    }

    /// Feed the next inbound message.
    pub fn receive(&mut self, request: UploadImageRequest) -> Result<(), ServiceError> {
        let result = self.step(request.data);
        if result.is_err() {
            self.state = UploadState::Finalized;
        }
        result
    }

    fn step(&mut self, data: Option<Data>) -> Result<(), ServiceError> {
        match &mut self.state {
            UploadState::AwaitInfo => match data {
                Some(Data::Info(info)) => {
                    self.state = UploadState::Accumulate {
                        info,
                        data: Vec::new(),
                    };
                    Ok(())
                }
                _ => Err(ServiceError::Unknown(
                    "cannot receive image info: first message must carry it".into(),
                )),
            },
            UploadState::Accumulate { data: buffer, .. } => match data {
                Some(Data::ChunkData(chunk)) => {
                    let size = buffer.len() + chunk.len();
                    if size > self.max_size {
                        return Err(ServiceError::InvalidArgument(format!(
                            "image is too large: {} > {}",
                            size, self.max_size
                        )));
                    }
                    buffer.extend_from_slice(&chunk);
                    Ok(())
                }
                _ => Err(ServiceError::Unknown(
                    "cannot receive chunk data: expected a chunk".into(),
                )),
            },
            UploadState::Finalized => Err(ServiceError::Unknown(
                "upload is already finalized".into(),
            )),
        }
    }

    /// End of input: take the header and the assembled bytes.
    pub fn finish(&mut self) -> Result<(ImageInfo, Vec<u8>), ServiceError> {
        match std::mem::replace(&mut self.state, UploadState::Finalized) {
            UploadState::Accumulate { info, data } => Ok((info, data)),
            UploadState::AwaitInfo => Err(ServiceError::Unknown(
                "cannot receive image info: stream closed".into(),
            )),
            UploadState::Finalized => Err(ServiceError::Unknown(
                "upload is already finalized".into(),
            )),
        }
    }
}
