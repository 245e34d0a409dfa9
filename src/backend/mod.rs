/// Backend controller between the editor UI and the file system / engines
///
/// Every request gets a fresh `RequestId`, returned to the caller and carried
/// by the notification it eventually produces. Requests are independent: the
/// controller keeps no per-request state. A dismissed dialog produces no
/// notification at all; every other failure arrives as `Event::Failed`.

pub mod error;
pub mod notify;

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use crate::collab::{Collaborators, PlaneRequest};
use crate::config::Settings;
use crate::data::model::{SaveFormat, ScannerModel, SequenceModel};
use crate::data::presets::PresetCatalog;
use crate::platform::{DialogSpec, FilePicker};

use error::{BackendError, BackendResult};
use notify::{Event, Notification, Notifier, Operation, RequestId};

pub struct Backend {
    picker: Box<dyn FilePicker>,
    presets: PresetCatalog,
    collab: Collaborators,
    notifier: Notifier,
}

/// Append the format's extension when the chosen path has none
fn with_default_extension(path: PathBuf, format: SaveFormat) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format.extension())
    }
}

impl Backend {
    pub fn new(
        picker: Box<dyn FilePicker>,
        presets: PresetCatalog,
        collab: Collaborators,
    ) -> (Self, Receiver<Notification>) {
        let (notifier, rx) = Notifier::channel();
        let backend = Self {
            picker,
            presets,
            collab,
            notifier,
        };
        (backend, rx)
    }

    pub fn from_settings(settings: &Settings, picker: Box<dyn FilePicker>) -> (Self, Receiver<Notification>) {
        Self::new(
            picker,
            PresetCatalog::new(settings.preset_dir.clone()),
            Collaborators::from_settings(settings),
        )
    }

    fn begin(&self, operation: Operation) -> RequestId {
        let request = RequestId::new();
        log::info!("[{}] {}", request.short(), operation);
        request
    }

    fn finish(&self, request: RequestId, operation: Operation, result: BackendResult<Event>) {
        match result {
            Ok(event) => self.notifier.send(request, event),
            Err(e) => self.notifier.fail(request, operation, e),
        }
    }

    fn collaborator_error(operation: Operation) -> impl Fn(String) -> BackendError {
        move |message| BackendError::Collaborator { operation, message }
    }

    /// Open dialog → read → notify. Cancel is silent.
    fn open_with<T, R, W>(&self, operation: Operation, dialog: DialogSpec, read: R, wrap: W) -> RequestId
    where
        T: 'static,
        R: FnOnce(&Path) -> BackendResult<T> + Send + 'static,
        W: FnOnce(PathBuf, T) -> Event + Send + 'static,
    {
        let request = self.begin(operation);
        let notifier = self.notifier.clone();
        self.picker.pick_open(
            request,
            dialog,
            Box::new(move |choice| {
                let Some(path) = choice else {
                    log::debug!("[{}] {} cancelled", request.short(), operation);
                    return;
                };
                match read(&path) {
                    Ok(model) => {
                        log::info!("[{}] read {}", request.short(), path.display());
                        notifier.send(request, wrap(path, model));
                    }
                    Err(e) => notifier.fail(request, operation, e),
                }
            }),
        );
        request
    }

    /// Save dialog → write → notify. Cancel is silent.
    fn save_with<W, E>(
        &self,
        request: RequestId,
        operation: Operation,
        format: SaveFormat,
        dialog: DialogSpec,
        write: W,
        wrap: E,
    ) where
        W: FnOnce(&Path) -> BackendResult<()> + Send + 'static,
        E: FnOnce(PathBuf) -> Event + Send + 'static,
    {
        let notifier = self.notifier.clone();
        self.picker.pick_save(
            request,
            dialog,
            Box::new(move |choice| {
                let Some(path) = choice else {
                    log::debug!("[{}] {} cancelled", request.short(), operation);
                    return;
                };
                let path = with_default_extension(path, format);
                match write(&path) {
                    Ok(()) => {
                        log::info!("[{}] wrote {}", request.short(), path.display());
                        notifier.send(request, wrap(path));
                    }
                    Err(e) => notifier.fail(request, operation, e),
                }
            }),
        );
    }

    /// Ask the user for a sequence file and load it
    pub fn upload_sequence(&self) -> RequestId {
        self.open_with(
            Operation::UploadSequence,
            DialogSpec::new("Open sequence", "Pulse sequence", &["json", "seq"]),
            SequenceModel::read,
            |path, model| Event::SequenceFileChosen { path, model },
        )
    }

    /// Publish the names of the available presets
    pub fn upload_sequence_from_presets(&self) -> RequestId {
        let op = Operation::UploadSequenceFromPresets;
        let request = self.begin(op);
        let result = self.presets.names().map(Event::PresetsAvailable);
        self.finish(request, op, result);
        request
    }

    pub fn load_preset_sequence(&self, name: &str) -> RequestId {
        let op = Operation::LoadPresetSequence;
        let request = self.begin(op);
        let result = self.presets.load(name).map(|model| Event::SequenceLoaded {
            name: name.to_string(),
            model,
        });
        self.finish(request, op, result);
        request
    }

    /// Validate the UI model, then ask where to save it.
    /// Invalid input fails before any dialog is shown.
    pub fn download_sequence(&self, ui_model: &str, extension: &str) -> RequestId {
        let op = Operation::DownloadSequence;
        let request = self.begin(op);
        let parsed = SaveFormat::for_sequence(extension)
            .and_then(|format| SequenceModel::from_ui(ui_model).map(|model| (format, model)));
        let (format, model) = match parsed {
            Ok(v) => v,
            Err(e) => {
                self.notifier.fail(request, op, e);
                return request;
            }
        };

        let dialog = DialogSpec::new("Save sequence", format.label(), &[format.extension()])
            .file_name(&format!("sequence.{}", format.extension()));
        self.save_with(
            request,
            op,
            format,
            dialog,
            move |path| model.write(path),
            Event::SequenceSaved,
        );
        request
    }

    pub fn upload_scanner(&self) -> RequestId {
        self.open_with(
            Operation::UploadScanner,
            DialogSpec::new("Open scanner", "Scanner", &["json"]),
            ScannerModel::read,
            |path, model| Event::ScannerFileChosen { path, model },
        )
    }

    pub fn download_scanner(&self, ui_model: &str) -> RequestId {
        let op = Operation::DownloadScanner;
        let request = self.begin(op);
        let model = match ScannerModel::from_ui(ui_model) {
            Ok(m) => m,
            Err(e) => {
                self.notifier.fail(request, op, e);
                return request;
            }
        };

        let format = SaveFormat::Json;
        let dialog = DialogSpec::new("Save scanner", format.label(), &[format.extension()])
            .file_name("scanner.json");
        self.save_with(
            request,
            op,
            format,
            dialog,
            move |path| model.write(path),
            Event::ScannerSaved,
        );
        request
    }

    pub fn plot_sequence(&self, ui_scan: &str, ui_seq: &str) -> RequestId {
        let op = Operation::PlotSequence;
        let request = self.begin(op);
        let result = ScannerModel::from_ui(ui_scan).and_then(|scan| {
            let seq = SequenceModel::from_ui(ui_seq)?;
            self.collab
                .plotter
                .plot(&scan, &seq)
                .map(Event::SequencePlotted)
                .map_err(Self::collaborator_error(op))
        });
        self.finish(request, op, result);
        request
    }

    /// Forward the slice-plane parameters as given
    pub fn plot_3d(&self, gx: f32, gy: f32, gz: f32, deltaf: f32, gamma: f32) -> RequestId {
        let op = Operation::Plot3d;
        let request = self.begin(op);
        let plane = PlaneRequest {
            gx,
            gy,
            gz,
            deltaf,
            gamma,
        };
        let result = self
            .collab
            .slice_plotter
            .plot_plane(plane)
            .map(Event::SlicePlaneReady)
            .map_err(Self::collaborator_error(op));
        self.finish(request, op, result);
        request
    }

    pub fn display_phantom(&self, filename: &str) -> RequestId {
        let op = Operation::DisplayPhantom;
        let request = self.begin(op);
        let result = self
            .collab
            .phantoms
            .display(filename)
            .map(Event::PhantomReady)
            .map_err(Self::collaborator_error(op));
        self.finish(request, op, result);
        request
    }

    /// Phantoms the renderer knows about, for the host's selector
    pub fn phantom_names(&self) -> Vec<String> {
        self.collab.phantoms.available()
    }

    pub fn simulate(&self, ui_seq: &str, ui_scan: &str) -> RequestId {
        let op = Operation::Simulate;
        let request = self.begin(op);
        let result = SequenceModel::from_ui(ui_seq).and_then(|seq| {
            let scan = ScannerModel::from_ui(ui_scan)?;
            self.collab
                .simulator
                .simulate(&seq, &scan)
                .map(Event::SimulationFinished)
                .map_err(Self::collaborator_error(op))
        });
        self.finish(request, op, result);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{
        PhantomLibrary, SimulationResult, SimulatorCommand, SlicePlane, SlicePlaneCalculator,
        SlicePlotter, Simulator, WaveformPlotter,
    };
    use crate::platform::{DeferredPicker, PickCallback};
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::{Arc, Mutex};

    /// Answers dialogs from a script and counts how many were shown
    #[derive(Clone, Default)]
    struct ScriptedPicker {
        answers: Arc<Mutex<VecDeque<Option<PathBuf>>>>,
        shown: Arc<Mutex<Vec<DialogSpec>>>,
    }

    impl ScriptedPicker {
        fn answer(&self, choice: Option<PathBuf>) {
            self.answers.lock().unwrap().push_back(choice);
        }

        fn shown(&self) -> usize {
            self.shown.lock().unwrap().len()
        }

        fn next(&self, dialog: DialogSpec, done: PickCallback) {
            self.shown.lock().unwrap().push(dialog);
            let choice = self.answers.lock().unwrap().pop_front().flatten();
            done(choice);
        }
    }

    impl FilePicker for ScriptedPicker {
        fn pick_open(&self, _request: RequestId, dialog: DialogSpec, done: PickCallback) {
            self.next(dialog, done);
        }

        fn pick_save(&self, _request: RequestId, dialog: DialogSpec, done: PickCallback) {
            self.next(dialog, done);
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSlicePlotter {
        calls: Arc<Mutex<Vec<PlaneRequest>>>,
    }

    impl SlicePlotter for RecordingSlicePlotter {
        fn plot_plane(&self, request: PlaneRequest) -> Result<SlicePlane, String> {
            self.calls.lock().unwrap().push(request);
            SlicePlaneCalculator.plot_plane(request)
        }
    }

    struct BrokenSimulator;

    impl Simulator for BrokenSimulator {
        fn simulate(&self, _seq: &SequenceModel, _scan: &ScannerModel) -> Result<SimulationResult, String> {
            Err("engine exploded at TR 3".to_string())
        }
    }

    fn collaborators(slice: Box<dyn SlicePlotter>, simulator: Box<dyn Simulator>) -> Collaborators {
        Collaborators {
            plotter: Box::new(WaveformPlotter),
            slice_plotter: slice,
            phantoms: Box::new(PhantomLibrary::new(std::env::temp_dir().join("seq_editor_no_phantoms"))),
            simulator,
        }
    }

    fn backend_with(picker: Box<dyn FilePicker>) -> (Backend, Receiver<Notification>) {
        Backend::new(
            picker,
            PresetCatalog::default(),
            collaborators(Box::new(SlicePlaneCalculator), Box::new(BrokenSimulator)),
        )
    }

    fn scripted() -> (ScriptedPicker, Backend, Receiver<Notification>) {
        let picker = ScriptedPicker::default();
        let (backend, rx) = backend_with(Box::new(picker.clone()));
        (picker, backend, rx)
    }

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("seq_editor_backend_{}.{}", uuid::Uuid::new_v4(), ext))
    }

    fn failure_message(n: &Notification) -> &str {
        match &n.event {
            Event::Failed { message, .. } => message,
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_download_then_upload_sequence() {
        let (picker, backend, rx) = scripted();
        let path = temp_path("seq");

        picker.answer(Some(path.clone()));
        let id = backend.download_sequence(r#"{"blocks":[]}"#, "seq");
        let n = rx.try_recv().unwrap();
        assert_eq!(n.request, id);
        assert_eq!(n.event, Event::SequenceSaved(path.clone()));

        let on_disk: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"blocks": []}));

        picker.answer(Some(path.clone()));
        let id = backend.upload_sequence();
        let n = rx.try_recv().unwrap();
        assert_eq!(n.request, id);
        match n.event {
            Event::SequenceFileChosen { path: p, model } => {
                assert_eq!(p, path);
                assert_eq!(model, SequenceModel::from_ui(r#"{"blocks":[]}"#).unwrap());
            }
            other => panic!("unexpected {:?}", other),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_download_then_upload_scanner() {
        let (picker, backend, rx) = scripted();
        let path = temp_path("json");
        let ui = r#"{"B0":1.5,"Gmax":0.06,"ADC_dt":2e-6}"#;

        picker.answer(Some(path.clone()));
        backend.download_scanner(ui);
        assert_eq!(rx.try_recv().unwrap().event, Event::ScannerSaved(path.clone()));

        picker.answer(Some(path.clone()));
        backend.upload_scanner();
        match rx.try_recv().unwrap().event {
            Event::ScannerFileChosen { model, .. } => {
                assert_eq!(model, ScannerModel::from_ui(ui).unwrap())
            }
            other => panic!("unexpected {:?}", other),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_cancelled_dialogs_are_silent() {
        let (picker, backend, rx) = scripted();
        picker.answer(None);
        backend.upload_sequence();
        picker.answer(None);
        backend.upload_scanner();
        picker.answer(None);
        backend.download_sequence(r#"{"blocks":[]}"#, "json");
        picker.answer(None);
        backend.download_scanner(r#"{"B0":3}"#);

        assert_eq!(picker.shown(), 4);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_save_appends_missing_extension() {
        let (picker, backend, rx) = scripted();
        let bare = temp_path("x").with_extension("");
        picker.answer(Some(bare.clone()));
        backend.download_sequence(r#"{"blocks":[]}"#, "seq");
        let expected = bare.with_extension("seq");
        assert_eq!(rx.try_recv().unwrap().event, Event::SequenceSaved(expected.clone()));
        assert!(expected.is_file());
        let _ = fs::remove_file(&expected);
    }

    #[test]
    fn test_invalid_download_fails_without_dialog() {
        let (picker, backend, rx) = scripted();
        backend.download_sequence("{\"blocks\": [", "seq");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("Invalid JSON"));

        backend.download_sequence(r#"{"blocks":[]}"#, "xml");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("xml"));

        backend.download_scanner("[]");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("Scanner model must be a JSON object"));

        assert_eq!(picker.shown(), 0);
    }

    #[test]
    fn test_upload_of_malformed_file_fails() {
        let (picker, backend, rx) = scripted();
        let path = temp_path("json");
        fs::write(&path, "not json at all").unwrap();
        picker.answer(Some(path.clone()));
        backend.upload_sequence();
        let n = rx.try_recv().unwrap();
        assert!(n.event.is_failure());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_preset_catalog_names() {
        let (_, backend, rx) = scripted();
        let id = backend.upload_sequence_from_presets();
        let n = rx.try_recv().unwrap();
        assert_eq!(n.request, id);
        match n.event {
            Event::PresetsAvailable(names) => {
                assert!(!names.is_empty());
                assert!(names.iter().all(|s| !s.is_empty()));
                let mut dedup = names.clone();
                dedup.dedup();
                assert_eq!(dedup, names);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_preset() {
        let (_, backend, rx) = scripted();
        backend.load_preset_sequence("gradient_echo");
        match rx.try_recv().unwrap().event {
            Event::SequenceLoaded { name, model } => {
                assert_eq!(name, "gradient_echo");
                assert!(model.blocks().is_some());
            }
            other => panic!("unexpected {:?}", other),
        }

        backend.load_preset_sequence("no_such_preset");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("not found"));
    }

    #[test]
    fn test_plot_3d_forwards_values_once() {
        let slice = RecordingSlicePlotter::default();
        let calls = Arc::clone(&slice.calls);
        let (backend, rx) = Backend::new(
            Box::new(ScriptedPicker::default()),
            PresetCatalog::default(),
            collaborators(Box::new(slice), Box::new(BrokenSimulator)),
        );

        backend.plot_3d(1.0, 0.0, 0.0, 0.0, 42.58);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            PlaneRequest {
                gx: 1.0,
                gy: 0.0,
                gz: 0.0,
                deltaf: 0.0,
                gamma: 42.58
            }
        );
        assert!(matches!(rx.try_recv().unwrap().event, Event::SlicePlaneReady(_)));
    }

    #[test]
    fn test_plot_sequence() {
        let (_, backend, rx) = scripted();
        backend.plot_sequence("{}", r#"{"blocks":[{"duration":0.001,"gx":1}]}"#);
        match rx.try_recv().unwrap().event {
            Event::SequencePlotted(plot) => assert!((plot.total_duration - 0.001).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }

        backend.plot_sequence("not json", "{}");
        assert!(rx.try_recv().unwrap().event.is_failure());
    }

    #[test]
    fn test_collaborator_failure_passes_message_through() {
        let (_, backend, rx) = scripted();
        backend.simulate(r#"{"blocks":[]}"#, "{}");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("engine exploded at TR 3"));
        match n.event {
            Event::Failed { operation, .. } => assert_eq!(operation, Operation::Simulate),
            _ => unreachable!(),
        }

        backend.display_phantom("brain");
        let n = rx.try_recv().unwrap();
        assert!(failure_message(&n).contains("not found"));
    }

    #[test]
    fn test_phantom_names_come_from_renderer() {
        let root = std::env::temp_dir().join(format!("seq_editor_backend_phantoms_{}", uuid::Uuid::new_v4()));
        for name in ["knee", "brain"] {
            fs::create_dir_all(root.join(name)).unwrap();
            fs::write(root.join(name).join("T1.nii.gz"), b"nii").unwrap();
        }
        fs::create_dir_all(root.join("no_volume")).unwrap();

        let mut collab = collaborators(Box::new(SlicePlaneCalculator), Box::new(BrokenSimulator));
        collab.phantoms = Box::new(PhantomLibrary::new(root.clone()));
        let (backend, rx) = Backend::new(Box::new(ScriptedPicker::default()), PresetCatalog::default(), collab);

        assert_eq!(backend.phantom_names(), vec!["brain".to_string(), "knee".to_string()]);
        assert!(rx.try_recv().is_err());

        backend.display_phantom("knee");
        match rx.try_recv().unwrap().event {
            Event::PhantomReady(image) => assert_eq!(image.path, root.join("knee").join("T1.nii.gz")),
            other => panic!("unexpected {:?}", other),
        }
        let _ = fs::remove_dir_all(&root);
    }

    #[cfg(unix)]
    #[test]
    fn test_simulate_with_engine() {
        let (backend, rx) = Backend::new(
            Box::new(ScriptedPicker::default()),
            PresetCatalog::default(),
            collaborators(
                Box::new(SlicePlaneCalculator),
                Box::new(crate::collab::CommandSimulator::new(Some(SimulatorCommand::new("cat")))),
            ),
        );
        backend.simulate(r#"{"blocks":[]}"#, r#"{"B0":1.5}"#);
        match rx.try_recv().unwrap().event {
            Event::SimulationFinished(result) => {
                assert_eq!(result.0["scanner"]["B0"], serde_json::json!(1.5))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_deferred_picker_completes_later() {
        let picker = DeferredPicker::new();
        let handle = picker.handle();
        let (backend, rx) = backend_with(Box::new(picker));
        let path = temp_path("json");
        fs::write(&path, r#"{"blocks":[{"duration":1}]}"#).unwrap();

        let id = backend.upload_sequence();
        assert!(rx.try_recv().is_err());
        let pending = handle.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request, id);

        assert!(handle.resolve(id, Some(path.clone())));
        let n = rx.try_recv().unwrap();
        assert_eq!(n.request, id);
        assert!(matches!(n.event, Event::SequenceFileChosen { .. }));

        let second = backend.upload_scanner();
        assert!(handle.resolve(second, None));
        assert!(rx.try_recv().is_err());
        let _ = fs::remove_file(&path);
    }
}
