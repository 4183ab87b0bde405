use gloo_file::{File as GlooFile, ObjectUrl};
use shared::upload::{UploadCandidate, validate_upload};
use shared::{Route, UploadAck};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::context::ContextHandle;
use yew::prelude::*;

use crate::components::upload_section::render_upload_section;
use crate::components::utils::{first_file, render_error_message};
use crate::context::AppContext;

pub struct SelectedFile {
    pub file: GlooFile,
    pub candidate: UploadCandidate,
    pub preview_url: Option<ObjectUrl>,
}

pub enum Msg {
    // File selection
    FileChosen(GlooFile),
    HandleDrop(DragEvent),
    ClearFile,

    // Upload
    Submit,
    Progress(u8),
    Uploaded(UploadAck),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    ContextChanged(AppContext),
}

pub struct UploadPage {
    pub(crate) selected: Option<SelectedFile>,
    pub(crate) is_dragging: bool,
    pub(crate) uploading: bool,
    pub(crate) upload_progress: u8,
    error: Option<String>,
    app: Option<AppContext>,
    _context_handle: Option<ContextHandle<AppContext>>,
}

impl Component for UploadPage {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let context = ctx
            .link()
            .context::<AppContext>(ctx.link().callback(Msg::ContextChanged));
        let (app, handle) = match context {
            Some((app, handle)) => (Some(app), Some(handle)),
            None => {
                log::error!("Upload view rendered outside the app shell");
                (None, None)
            }
        };

        Self {
            selected: None,
            is_dragging: false,
            uploading: false,
            upload_progress: 0,
            error: None,
            app,
            _context_handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(file) => self.handle_file_chosen(file),
            Msg::HandleDrop(event) => self.handle_drop(ctx, event),
            Msg::ClearFile => {
                self.selected = None;
                self.error = None;
                true
            }

            Msg::Submit => self.handle_submit(ctx),
            Msg::Progress(percent) => {
                let changed = percent > self.upload_progress;
                self.upload_progress = self.upload_progress.max(percent);
                changed
            }
            Msg::Uploaded(ack) => self.handle_uploaded(ack),

            Msg::SetError(error) => {
                self.error = error;
                self.uploading = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                let changed = self.is_dragging != is_dragging;
                self.is_dragging = is_dragging;
                changed
            }
            Msg::ContextChanged(app) => {
                self.app = Some(app);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <section class="page upload-page">
                <header class="page-header">
                    <h1>{"Upload Spine X-ray"}</h1>
                    <p class="subtitle">{"The scan is analyzed automatically once the upload finishes."}</p>
                </header>
                { render_error_message(self.error.as_deref(), ctx.link().callback(|_| Msg::SetError(None))) }
                { render_upload_section(self, ctx) }
            </section>
        }
    }
}

impl UploadPage {
    fn handle_file_chosen(&mut self, file: GlooFile) -> bool {
        match validate_upload(&file.name(), file.size()) {
            Ok(candidate) => {
                let preview_url = file
                    .raw_mime_type()
                    .starts_with("image/")
                    .then(|| ObjectUrl::from(file.clone()));
                log::info!("Selected {} ({} bytes)", candidate.file_name, candidate.size);
                self.selected = Some(SelectedFile {
                    file,
                    candidate,
                    preview_url,
                });
                self.error = None;
            }
            Err(e) => {
                log::warn!("Rejected {}: {}", file.name(), e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn handle_drop(&mut self, ctx: &Context<Self>, event: DragEvent) -> bool {
        event.prevent_default();
        self.is_dragging = false;

        let file = event
            .data_transfer()
            .and_then(|data_transfer| data_transfer.files())
            .as_ref()
            .and_then(first_file);
        if let Some(file) = file {
            ctx.link().send_message(Msg::FileChosen(file));
        }

        true
    }

    fn handle_submit(&mut self, ctx: &Context<Self>) -> bool {
        if self.uploading {
            return false;
        }
        let Some(selected) = &self.selected else {
            self.error = Some(shared::ValidationError::NoFileSelected.to_string());
            return true;
        };
        let Some(app) = &self.app else {
            return false;
        };

        self.uploading = true;
        self.upload_progress = 0;
        self.error = None;

        let api = app.api.clone();
        let file = selected.file.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let progress_link = link.clone();
            let uploaded = api
                .upload_xray(&file, move |percent| progress_link.send_message(Msg::Progress(percent)))
                .await;
            match uploaded {
                Ok(ack) => link.send_message(Msg::Uploaded(ack)),
                Err(e) => {
                    log::error!("❌ Upload failed: {}", e);
                    link.send_message(Msg::SetError(Some(e.into_upload_error().to_string())));
                }
            }
        });

        true
    }

    fn handle_uploaded(&mut self, ack: UploadAck) -> bool {
        log::info!("✅ Upload accepted as {}", ack.upload_id);
        self.uploading = false;
        self.upload_progress = 100;
        if let Some(app) = &self.app {
            app.navigate.emit(Route::after_upload(&ack));
        }
        true
    }
}
