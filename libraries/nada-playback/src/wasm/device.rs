//! `HTMLAudioElement` playback device

use crate::device::{
    DeviceEvent, DeviceEventSender, LoadId, PlayAttemptId, PlayRejection, PlaybackDevice,
};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, HtmlAudioElement};

type Listener = Closure<dyn FnMut(Event)>;

/// Playback device wrapping one detached `<audio>` element
pub struct HtmlAudioDevice {
    element: HtmlAudioElement,
    load: Rc<Cell<Option<LoadId>>>,
    events: Option<DeviceEventSender>,
    listeners: Vec<(&'static str, Listener)>,
}

impl HtmlAudioDevice {
    /// Create a device with a fresh audio element
    pub fn new() -> Result<Self, JsValue> {
        let element = HtmlAudioElement::new()?;
        element.set_preload("metadata");

        Ok(Self {
            element,
            load: Rc::new(Cell::new(None)),
            events: None,
            listeners: Vec::new(),
        })
    }

    /// The underlying element
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    fn listen(&mut self, name: &'static str, listener: Listener) {
        if let Err(e) = self
            .element
            .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
        {
            tracing::warn!("Failed to attach {} listener: {:?}", name, e);
            return;
        }
        self.listeners.push((name, listener));
    }
}

fn rejection_from(error: &JsValue) -> PlayRejection {
    let name = js_sys::Reflect::get(error, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
        .unwrap_or_default();

    match name.as_str() {
        "NotAllowedError" => PlayRejection::NotAllowed,
        "AbortError" => PlayRejection::Aborted,
        "" => PlayRejection::Source(format!("{:?}", error)),
        _ => PlayRejection::Source(name),
    }
}

impl PlaybackDevice for HtmlAudioDevice {
    fn subscribe(&mut self, events: DeviceEventSender) {
        self.unsubscribe();

        let (element, load, tx) = (self.element.clone(), Rc::clone(&self.load), events.clone());
        let on_time = Closure::wrap(Box::new(move |_: Event| {
            if let Some(load) = load.get() {
                tx.send(DeviceEvent::TimeUpdate {
                    load,
                    position: element.current_time(),
                });
            }
        }) as Box<dyn FnMut(Event)>);

        let (element, load, tx) = (self.element.clone(), Rc::clone(&self.load), events.clone());
        let on_metadata = Closure::wrap(Box::new(move |_: Event| {
            let duration = element.duration();
            // Streams report an infinite duration
            if let (Some(load), true) = (load.get(), duration.is_finite()) {
                tx.send(DeviceEvent::MetadataLoaded { load, duration });
            }
        }) as Box<dyn FnMut(Event)>);

        let (load, tx) = (Rc::clone(&self.load), events.clone());
        let on_ended = Closure::wrap(Box::new(move |_: Event| {
            if let Some(load) = load.get() {
                tx.send(DeviceEvent::Ended { load });
            }
        }) as Box<dyn FnMut(Event)>);

        self.listen("timeupdate", on_time);
        self.listen("loadedmetadata", on_metadata);
        self.listen("ended", on_ended);
        self.events = Some(events);
    }

    fn unsubscribe(&mut self) {
        for (name, listener) in self.listeners.drain(..) {
            self.element
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
                .ok();
        }
        self.events = None;
    }

    fn load(&mut self, load: LoadId, source: &str) {
        self.load.set(Some(load));
        self.element.set_src(source);
        self.element.load();
    }

    fn unload(&mut self) {
        self.load.set(None);
        self.element.remove_attribute("src").ok();
        self.element.load();
    }

    fn play(&mut self, attempt: PlayAttemptId) {
        let Some(events) = self.events.clone() else {
            return;
        };

        let promise = match self.element.play() {
            Ok(promise) => promise,
            Err(e) => {
                events.send(DeviceEvent::PlayResolved {
                    attempt,
                    result: Err(rejection_from(&e)),
                });
                return;
            }
        };

        // The promise settles after this call returns
        spawn_local(async move {
            let result = match JsFuture::from(promise).await {
                Ok(_) => Ok(()),
                Err(e) => Err(rejection_from(&e)),
            };
            events.send(DeviceEvent::PlayResolved { attempt, result });
        });
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            tracing::warn!("Audio element refused pause: {:?}", e);
        }
    }

    fn set_position(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(f64::from(volume));
    }
}

impl Drop for HtmlAudioDevice {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
