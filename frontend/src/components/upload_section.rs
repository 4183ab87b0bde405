use shared::display::format_file_size;
use shared::upload::UploadCandidate;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

use super::utils::{debounce, first_file, render_progress_bar};
use crate::pages::upload::{Msg, UploadPage};

pub fn render_upload_section(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    html! {
        <div class="upload-section">
            {
                match &page.selected {
                    Some(selected) => render_selected_file(page, ctx, &selected.candidate),
                    None => render_file_input_area(page, ctx),
                }
            }
        </div>
    }
}

fn render_file_input_area(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    let link = ctx.link();
    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_file);

        input.set_value("");

        match file {
            Some(file) => Msg::FileChosen(file),
            None => Msg::SetError(Some(shared::ValidationError::NoFileSelected.to_string())),
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        let input = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"));
        if let Some(input) = input {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept=".png,.jpg,.jpeg,.dcm,.dicom"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", page.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, move || trigger_file_input.emit(()))}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop a spine X-ray here, or click to browse"}</p>
                    <p class="file-types">{"Supported formats: PNG, JPG, DICOM (max 50MB)"}</p>
                </div>
            </div>
        </>
    }
}

fn render_selected_file(page: &UploadPage, ctx: &Context<UploadPage>, candidate: &UploadCandidate) -> Html {
    let link = ctx.link();
    let preview = page.selected.as_ref().and_then(|s| s.preview_url.as_ref());

    html! {
        <div id="preview-container">
            {
                match preview {
                    Some(url) => html! {
                        <img id="actual-image-preview" src={url.to_string()} alt={candidate.file_name.clone()} />
                    },
                    None => html! {
                        <div class="preview-placeholder">
                            <i class="fa-solid fa-file-medical fa-2x"></i>
                            <p>{ if candidate.is_dicom() { "DICOM file (no preview)" } else { "Preview unavailable" } }</p>
                        </div>
                    },
                }
            }
            <div class="file-details">
                <p class="file-name">{ candidate.file_name.clone() }</p>
                <p class="file-size">{ format_file_size(candidate.size) }</p>
            </div>

            if page.uploading {
                { render_progress_bar(page.upload_progress, "Uploading...") }
            } else {
                <div class="button-container">
                    <button class="analyze-btn secondary" onclick={link.callback(|_| Msg::ClearFile)}>
                        <i class="fa-solid fa-rotate"></i>{" Change"}
                    </button>
                    <button class="analyze-btn" onclick={link.callback(|_| Msg::Submit)}>
                        <i class="fa-solid fa-magnifying-glass"></i>{" Analyze X-ray"}
                    </button>
                </div>
            }
        </div>
    }
}
