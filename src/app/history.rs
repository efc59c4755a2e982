//! Command-basierte Undo/Redo-History.
//!
//! Der `CommandManager` besitzt den einzigen mutierbaren Editor-Zustand.
//! Jede Änderung läuft über [`CommandManager::dispatch`]; Undo und Redo
//! sind striktes LIFO über genau diese Reihenfolge.

use std::collections::BTreeMap;

use super::commands::{EditCommand, Inverse};
use super::state::{EditorState, EntityRef, SelectionState};
use crate::core::{FaceDetector, FloorPlan, GraphError, GraphResult, Surface};
use crate::shared::{DrawingOptions, HISTORY_DEPTH};

/// Ein angewendeter Command mit allem, was zum Zurücknehmen nötig ist.
#[derive(Debug, Clone)]
pub struct AppliedCommand {
    command: EditCommand,
    /// `None` solange der Eintrag auf dem Redo-Stack liegt
    inverse: Option<Inverse>,
    surfaces_before: BTreeMap<u64, Surface>,
    surfaces_after: BTreeMap<u64, Surface>,
    selection_before: SelectionState,
    selection_after: SelectionState,
}

impl AppliedCommand {
    /// Der ursprünglich dispatchte Command
    pub fn command(&self) -> &EditCommand {
        &self.command
    }
}

/// Begrenzter Undo/Redo-Speicher.
#[derive(Debug)]
pub struct EditHistory {
    undo_stack: Vec<AppliedCommand>,
    redo_stack: Vec<AppliedCommand>,
    max_depth: usize,
}

impl EditHistory {
    /// Erstellt einen neuen History-Speicher mit maximaler Tiefe.
    pub fn new_with_capacity(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Zeichnet einen neuen Eintrag auf; ein bestehender Redo-Zweig wird verworfen.
    pub fn record(&mut self, entry: AppliedCommand) {
        self.push_undo(entry);
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, entry: AppliedCommand) {
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(entry);
    }

    fn push_redo(&mut self, entry: AppliedCommand) {
        if self.redo_stack.len() >= self.max_depth {
            self.redo_stack.remove(0);
        }
        self.redo_stack.push(entry);
    }

    /// Prüft ob Undo möglich ist.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Prüft ob Redo möglich ist.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Commands auf dem Undo-Stack (ältester zuerst)
    pub fn entries(&self) -> impl Iterator<Item = &EditCommand> {
        self.undo_stack.iter().map(AppliedCommand::command)
    }
}

/// Besitzt den Editor-Zustand und führt alle Änderungen als Commands aus.
#[derive(Debug)]
pub struct CommandManager {
    state: EditorState,
    detector: FaceDetector,
    history: EditHistory,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    /// Leere Session mit Standard-History-Tiefe.
    pub fn new() -> Self {
        Self::with_history_depth(HISTORY_DEPTH)
    }

    /// Leere Session mit vorgegebener History-Tiefe.
    pub fn with_history_depth(max_depth: usize) -> Self {
        Self {
            state: EditorState::new(),
            detector: FaceDetector::new(),
            history: EditHistory::new_with_capacity(max_depth),
        }
    }

    /// Leere Session gemäß Zeichen-Optionen.
    pub fn with_options(options: &DrawingOptions) -> Self {
        Self::with_history_depth(options.history_depth)
    }

    /// Session aus einem vorhandenen Grundriss (z.B. Import).
    ///
    /// Die Räume werden neu erkannt; bestehende Raum-IDs bleiben bei gleicher
    /// Signatur erhalten. Die History ist leer.
    pub fn from_plan(
        mut plan: FloorPlan,
        mut detector: FaceDetector,
        max_depth: usize,
    ) -> GraphResult<Self> {
        detector.recompute(&mut plan)?;
        Ok(Self {
            state: EditorState::from_plan(plan),
            detector,
            history: EditHistory::new_with_capacity(max_depth),
        })
    }

    // ── Read-only Zugriff ───────────────────────────────────────────

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn plan(&self) -> &FloorPlan {
        &self.state.plan
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state.selection
    }

    pub fn detector(&self) -> &FaceDetector {
        &self.detector
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Anzahl der Undo-Schritte
    pub fn history_len(&self) -> usize {
        self.history.undo_len()
    }

    // ── Selektion ───────────────────────────────────────────────────

    /// Selektiert eine existierende Entität (nicht Teil der History).
    pub fn select(&mut self, entity: EntityRef) -> GraphResult<bool> {
        if !entity.exists_in(&self.state.plan) {
            return Err(GraphError::InvalidReference {
                kind: entity.kind(),
                id: entity.id(),
            });
        }
        Ok(self.state.selection.insert(entity))
    }

    /// Hebt die Selektion auf.
    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Führt einen Command aus und zeichnet ihn in der History auf.
    ///
    /// Bei Fehler bleibt der Zustand unverändert und der Command wird verworfen.
    pub fn dispatch(&mut self, command: EditCommand) -> GraphResult<()> {
        let surfaces_before = self.state.plan.surfaces().clone();
        let selection_before = self.state.selection.clone();

        let inverse = match self.apply_and_detect(&command, &surfaces_before) {
            Ok(inverse) => inverse,
            Err(e) => {
                log::warn!("Command abgelehnt ({}): {}", command, e);
                return Err(e);
            }
        };

        self.state.selection.prune(&self.state.plan);
        log::info!(
            "{} ({} Wände, {} Räume)",
            command,
            self.state.plan.wall_count(),
            self.state.plan.room_count()
        );

        self.history.record(AppliedCommand {
            command,
            inverse: Some(inverse),
            surfaces_before,
            surfaces_after: self.state.plan.surfaces().clone(),
            selection_before,
            selection_after: self.state.selection.clone(),
        });
        Ok(())
    }

    /// Wendet die Struktur-Änderung an und erkennt die Räume neu.
    ///
    /// Schlägt die Erkennung fehl, wird die Änderung zurückgenommen.
    fn apply_and_detect(
        &mut self,
        command: &EditCommand,
        surfaces_before: &BTreeMap<u64, Surface>,
    ) -> GraphResult<Inverse> {
        let inverse = match command.apply(&mut self.state.plan) {
            Ok(inverse) => inverse,
            Err(e) => {
                self.state.plan.replace_surfaces(surfaces_before.clone());
                return Err(e);
            }
        };
        if !command.is_structural() {
            return Ok(inverse);
        }

        match self.detector.recompute(&mut self.state.plan) {
            Ok(()) => Ok(inverse),
            Err(e) => {
                inverse.revert(&mut self.state.plan)?;
                self.state.plan.replace_surfaces(surfaces_before.clone());
                Err(e)
            }
        }
    }

    /// Nimmt den letzten Command zurück. `Ok(false)` bei leerer History.
    pub fn undo(&mut self) -> GraphResult<bool> {
        let Some(mut entry) = self.history.undo_stack.pop() else {
            log::debug!("Undo: nichts zurückzunehmen");
            return Ok(false);
        };

        let Some(inverse) = entry.inverse.take() else {
            return Err(GraphError::InvariantViolation(format!(
                "Undo-Eintrag \"{}\" ohne Umkehrung",
                entry.command
            )));
        };
        inverse.revert(&mut self.state.plan)?;
        self.state
            .plan
            .replace_surfaces(entry.surfaces_before.clone());
        self.state.selection = entry.selection_before.clone();

        log::info!("Rückgängig: {}", entry.command);
        self.history.push_redo(entry);
        Ok(true)
    }

    /// Wendet den zuletzt zurückgenommenen Command erneut an. `Ok(false)` ohne Redo-Eintrag.
    ///
    /// Die Räume werden nicht neu erkannt, sondern exakt auf den Stand nach
    /// dem ursprünglichen Ausführen gesetzt (keine neuen Raum-IDs).
    pub fn redo(&mut self) -> GraphResult<bool> {
        let Some(mut entry) = self.history.redo_stack.pop() else {
            log::debug!("Redo: nichts zu wiederholen");
            return Ok(false);
        };

        let inverse = match entry.command.apply(&mut self.state.plan) {
            Ok(inverse) => inverse,
            Err(e) => {
                log::warn!("Redo fehlgeschlagen ({}): {}", entry.command, e);
                self.history.redo_stack.push(entry);
                return Err(e);
            }
        };
        self.state
            .plan
            .replace_surfaces(entry.surfaces_after.clone());
        self.state.selection = entry.selection_after.clone();
        entry.inverse = Some(inverse);

        log::info!("Wiederholt: {}", entry.command);
        self.history.push_undo(entry);
        Ok(true)
    }
}
