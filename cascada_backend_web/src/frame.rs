// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! OPAQUE_FRAME tier: the server's page in an `<iframe>`.

use cascada_core::host::{FrameSetup, HostError};
use web_sys::{Document, HtmlElement, HtmlIFrameElement};

use crate::js;

/// A live frame. It reports nothing back.
#[derive(Debug)]
pub struct Frame {
    element: HtmlIFrameElement,
}

impl Frame {
    pub(crate) fn create(
        document: &Document,
        container: &HtmlElement,
        setup: &FrameSetup<'_>,
    ) -> Result<Self, HostError> {
        let element: HtmlIFrameElement = js::create(document, "iframe")?;
        element.set_src(setup.url);
        element.set_width("100%");
        element.set_height("100%");
        element.set_allow_fullscreen(true);
        element.set_frame_border("0");
        element.set_scrolling("auto");
        let _ = element.set_attribute("allow", setup.allow);
        let _ = element.set_attribute("loading", "lazy");
        container
            .append_child(&element)
            .map_err(|err| js::dom_error("append iframe", &err))?;
        Ok(Self { element })
    }

    pub(crate) fn release(self) {
        self.element.remove();
    }
}
