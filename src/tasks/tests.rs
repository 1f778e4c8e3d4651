// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::category::Category;
use crate::config::{CcRange, Exception, Exceptions, MidiForMacros, Settings};
use crate::log::MemoryLog;
use crate::program::{ConnectionsParent, ModulationSource, Program};
use crate::testutil::{self, MacroSpec, ProgramSpec};

use super::{ConfigTask, TaskContext};

struct Fixture {
    _dir: TempDir,
    settings: Settings,
    log: MemoryLog,
}

impl Fixture {
    fn new() -> Result<Fixture, Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let settings = testutil::settings(dir.path());
        Ok(Fixture {
            _dir: dir,
            settings,
            log: MemoryLog::new(),
        })
    }

    fn with_exceptions(mut self, exceptions: Exceptions) -> Fixture {
        self.settings = self.settings.with_exceptions(exceptions);
        self
    }

    fn with_midi(mut self, midi: MidiForMacros) -> Fixture {
        self.settings = Settings::new(self.settings.folders().clone(), midi);
        self
    }

    fn write(&self, spec: &ProgramSpec, sound_bank: &str, category: &str, name: &str) -> PathBuf {
        spec.write(&self.settings.folders().programs, sound_bank, category, name)
    }

    fn run(&self, task: ConfigTask, path: &Path) -> Result<(), crate::Error> {
        task.run(path, &TaskContext::new(&self.settings, &self.log))
    }

    fn run_in_category(&self, task: ConfigTask, path: &Path) -> Result<(), Box<dyn Error>> {
        let category_name = folder(path.parent())?;
        let sound_bank = folder(path.parent().and_then(Path::parent))?;
        let category = Category::new(&self.settings, &sound_bank, &category_name)?;
        task.run(
            path,
            &TaskContext::new(&self.settings, &self.log).with_category(&category),
        )?;
        Ok(())
    }
}

fn folder(path: Option<&Path>) -> Result<String, Box<dyn Error>> {
    Ok(path
        .and_then(Path::file_name)
        .ok_or("no folder name")?
        .to_string_lossy()
        .to_string())
}

fn macro_summary(program: &Program) -> Vec<(String, Option<u8>, i32, i32)> {
    program
        .macros()
        .iter()
        .map(|m| (m.display_name().to_string(), m.cc(), m.x(), m.y()))
        .collect()
}

#[test]
fn task_names() -> Result<(), Box<dyn Error>> {
    assert_eq!(ConfigTask::ReuseCc1, "ReuseCc1".parse::<ConfigTask>()?);
    assert!("Frobnicate".parse::<ConfigTask>().is_err());
    assert!(ConfigTask::is_valid_name("QueryCountMacros"));
    assert!(!ConfigTask::is_valid_name("Frobnicate"));
    assert!(ConfigTask::QueryDelayTypes.is_query());
    assert!(!ConfigTask::ReuseCc1.is_query());

    let parameters = vec![
        ("OldCcNo".to_string(), "35".to_string()),
        ("NewCcNo".to_string(), " 11 ".to_string()),
    ];
    let task = ConfigTask::from_name("ChangeMacroCcNo", &parameters)?;
    assert_eq!(ConfigTask::ChangeMacroCcNo { old: 35, new: 11 }, task);
    assert_eq!("ChangeMacroCcNo (35 to 11)", task.to_string());
    assert!(ConfigTask::from_name("ChangeMacroCcNo", &parameters[..1]).is_err());
    assert!(ConfigTask::from_name(
        "ChangeMacroCcNo",
        &[
            ("OldCcNo".to_string(), "35".to_string()),
            ("NewCcNo".to_string(), "1".to_string())
        ]
    )
    .is_err());
    Ok(())
}

#[test]
fn exclusions() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?.with_exceptions(Exceptions {
        must_use_gui_script_processor: vec![Exception::category("Pulsar", "Leads")],
        do_not_replace_mod_wheel: vec![Exception::sound_bank("Fluidity")],
        do_not_zero_reverb: vec![Exception::category("Ether Fields", "Pads")],
    });
    let settings = &fixture.settings;

    let replace = ConfigTask::ReplaceModWheelWithMacro;
    assert!(replace.exclusion(settings, "Fluidity", None).is_some());
    assert!(replace.exclusion(settings, "Pulsar", None).is_none());
    assert!(replace.exclusion(settings, "Pulsar", Some("Leads")).is_some());
    assert!(replace.exclusion(settings, "Pulsar", Some("Pads")).is_none());
    assert!(ConfigTask::ZeroReverbMacros
        .exclusion(settings, "Ether Fields", Some("Pads"))
        .is_some());
    assert!(ConfigTask::ZeroReverbMacros
        .exclusion(settings, "Ether Fields", None)
        .is_none());
    assert!(ConfigTask::UpdateMacroCcs
        .exclusion(settings, "Pulsar", Some("Leads"))
        .is_none());
    Ok(())
}

#[test]
fn restore_original_copies_the_mirror() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let spec = ProgramSpec::new("Pulsar", vec![MacroSpec::continuous("Cutoff", 10, 10)]);
    let original = spec.write(&fixture.settings.folders().original_programs, "Pulsar", "Leads", "Soft");
    let working = fixture.settings.folders().programs.join("Pulsar").join("Leads").join("Soft.uvip");

    fixture.run(ConfigTask::RestoreOriginal, &working)?;
    assert_eq!(fs::read(&original)?, fs::read(&working)?);
    assert!(fixture.log.contains("Pulsar\\Leads\\Soft: Restored the original."));

    fixture.run(ConfigTask::RestoreOriginal, &working)?;
    assert_eq!(1, fixture.log.lines().len());

    let missing = working.with_file_name("Missing.uvip");
    assert!(fixture.run(ConfigTask::RestoreOriginal, &missing).is_err());
    Ok(())
}

#[test]
fn initialise_layout_removes_gui_and_standardises() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("B", 300, 200).cc(32),
                MacroSpec::continuous("A", 20, 210).cc(31),
                MacroSpec::continuous("C", 50, 330).cc(33),
                MacroSpec::continuous("Hidden", 800, 0),
            ],
        )
        .script_processor("GuiScript", "./Gui.lua", &[(31, "knob1")]),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::InitialiseLayout, &path)?;

    let program = Program::read(&path)?;
    assert!(program.script_processors().is_empty());
    assert_eq!(
        vec![
            ("A".to_string(), Some(31), 91, 365),
            ("B".to_string(), Some(32), 242, 365),
            ("C".to_string(), Some(33), 393, 365),
            ("Hidden".to_string(), None, 800, 0),
        ],
        macro_summary(&program)
    );
    assert!(fixture.log.contains("Removed GUI script processor 'GuiScript'."));
    Ok(())
}

#[test]
fn stacked_macros_stay_hidden() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("A", 100, 300),
                MacroSpec::continuous("Hidden 1", 400, 300),
                MacroSpec::continuous("Hidden 2", 400, 300),
                MacroSpec::continuous("B", 200, 300),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    fixture.run(ConfigTask::UpdateMacroCcs, &path)?;

    let program = Program::read(&path)?;
    assert_eq!(vec![0, 1], program.visible_macro_indices());
    assert_eq!(
        vec![
            ("A".to_string(), Some(31), 91, 365),
            ("B".to_string(), Some(32), 242, 365),
            ("Hidden 1".to_string(), None, 400, 300),
            ("Hidden 2".to_string(), None, 400, 300),
        ],
        macro_summary(&program)
    );
    Ok(())
}

#[test]
fn initialise_layout_keeps_required_gui() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?.with_exceptions(Exceptions {
        must_use_gui_script_processor: vec![Exception::sound_bank("Pulsar")],
        ..Exceptions::default()
    });
    let spec = ProgramSpec::new("Pulsar", vec![MacroSpec::continuous("A", 91, 365)])
        .script_processor("GuiScript", "./Gui.lua", &[(31, "knob1")]);
    let path = fixture.write(&spec, "Pulsar", "Leads", "Soft");

    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    assert_eq!(1, Program::read(&path)?.script_processors().len());

    let voklm = ProgramSpec::new("Voklm", vec![MacroSpec::continuous("A", 91, 365)])
        .script_processor("GuiScript", "./Gui.lua", &[(31, "knob1")]);
    let path = fixture.write(&voklm, "Voklm", "Choirs", "Ahh");
    let error = fixture
        .run(ConfigTask::InitialiseLayout, &path)
        .err()
        .ok_or("expected an error")?;
    assert!(error.to_string().contains("must_use_gui_script_processor"));
    Ok(())
}

#[test]
fn initialise_layout_moves_effect_macros_last_for_spectre() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Spectre",
            vec![
                MacroSpec::continuous("Reverb", 91, 365),
                MacroSpec::continuous("Delay", 242, 365),
                MacroSpec::continuous("Cutoff", 393, 365),
                MacroSpec::continuous("Drive", 544, 365),
            ],
        ),
        "Spectre",
        "Leads",
        "Glass",
    );

    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    let names: Vec<String> = macro_summary(&Program::read(&path)?)
        .into_iter()
        .map(|(name, _, x, _)| format!("{}@{}", name, x))
        .collect();
    assert_eq!(vec!["Cutoff@91", "Drive@242", "Delay@393", "Reverb@544"], names);

    let before = fs::read(&path)?;
    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    assert_eq!(before, fs::read(&path)?);
    Ok(())
}

#[test]
fn fluidity_layout_is_nudged() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new("Fluidity", vec![MacroSpec::continuous("A", 0, 0)]),
        "Fluidity",
        "Keys",
        "Soft",
    );
    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    assert_eq!(330, Program::read(&path)?.macros()[0].y());
    Ok(())
}

#[test]
fn organic_pads_needs_its_scripts() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let spec = ProgramSpec::new(
        "Organic Pads",
        vec![
            MacroSpec::continuous("Strings", 91, 365),
            MacroSpec::continuous("Choir", 242, 365),
        ],
    )
    .layer("Strings", None)
    .layer("Choir", None);
    let path = fixture.write(&spec, "Organic Pads", "Pads", "Dawn");

    let error = fixture
        .run(ConfigTask::InitialiseLayout, &path)
        .err()
        .ok_or("expected an error")?;
    assert!(error.to_string().contains("OrganicPads_DahdsrController.lua"));

    let scripts = fixture.settings.folders().template_programs.join("Organic Pads");
    fs::create_dir_all(&scripts)?;
    fs::write(scripts.join("OrganicPads_DahdsrController.lua"), "")?;
    fs::write(scripts.join("OrganicPads_LayerGains.lua"), "")?;
    fixture.run(ConfigTask::InitialiseLayout, &path)?;

    let program = Program::read(&path)?;
    let names: Vec<&str> = program.script_processors().iter().map(|s| s.name()).collect();
    assert_eq!(vec!["OrganicPads_DahdsrController", "OrganicPads_LayerGains"], names);
    let gains: Vec<(String, String)> = program
        .layers()
        .iter()
        .flat_map(|layer| layer.modulations().iter())
        .map(|m| (m.source().to_string(), m.destination().to_string()))
        .collect();
    assert_eq!(
        vec![
            ("$Program/Macro 1".to_string(), "Gain".to_string()),
            ("$Program/Macro 2".to_string(), "Gain".to_string()),
        ],
        gains
    );
    assert!(program.to_xml_string().contains(r#"AttackTime="0.02" ReleaseTime="0.3""#));

    let before = fs::read(&path)?;
    fixture.run(ConfigTask::InitialiseLayout, &path)?;
    assert_eq!(before, fs::read(&path)?);
    Ok(())
}

#[test]
fn update_macro_ccs_numbers_in_location_order() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("D", 91, 365),
                MacroSpec::continuous("B", 242, 250).cc(40),
                MacroSpec::continuous("E", 242, 365),
                MacroSpec::continuous("A", 91, 250).cc(7),
                MacroSpec::continuous("C", 393, 250),
            ],
        ),
        "Pulsar",
        "Leads",
        "Five",
    );

    fixture.run_in_category(ConfigTask::UpdateMacroCcs, &path)?;
    let ccs: Vec<(String, Option<u8>)> = macro_summary(&Program::read(&path)?)
        .into_iter()
        .map(|(name, cc, _, _)| (name, cc))
        .collect();
    assert_eq!(
        vec![
            ("D".to_string(), Some(34)),
            ("B".to_string(), Some(32)),
            ("E".to_string(), Some(35)),
            ("A".to_string(), Some(31)),
            ("C".to_string(), Some(33)),
        ],
        ccs
    );
    Ok(())
}

#[test]
fn update_macro_ccs_copies_template_map() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?.with_exceptions(Exceptions {
        must_use_gui_script_processor: vec![Exception::sound_bank("Pulsar")],
        ..Exceptions::default()
    });
    let template = ProgramSpec::new("Pulsar", vec![])
        .script_processor("GuiScript", "./Gui.lua", &[(31, "knob1"), (32, "knob2"), (112, "switch1")]);
    template.write(&fixture.settings.folders().template_programs, "Pulsar", "Leads", "Template");
    let path = fixture.write(
        &ProgramSpec::new("Pulsar", vec![MacroSpec::continuous("A", 800, 0)])
            .script_processor("GuiScript", "./Gui.lua", &[(40, "knob1")]),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run_in_category(ConfigTask::UpdateMacroCcs, &path)?;
    let program = Program::read(&path)?;
    let map: Vec<(Option<u8>, String)> = program.script_processors()[0]
        .modulations()
        .iter()
        .map(|m| (m.cc(), m.destination().to_string()))
        .collect();
    assert_eq!(
        vec![
            (Some(31), "knob1".to_string()),
            (Some(32), "knob2".to_string()),
            (Some(112), "switch1".to_string()),
        ],
        map
    );

    let before = fs::read(&path)?;
    fixture.run_in_category(ConfigTask::UpdateMacroCcs, &path)?;
    assert_eq!(before, fs::read(&path)?);
    Ok(())
}

#[test]
fn change_macro_cc_no() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("A", 91, 365).cc(35),
                MacroSpec::continuous("B", 242, 365).cc(36),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );
    fixture.run(ConfigTask::ChangeMacroCcNo { old: 35, new: 11 }, &path)?;

    let program = Program::read(&path)?;
    assert_eq!(Some(11), program.macros()[0].cc());
    assert_eq!(Some(36), program.macros()[1].cc());
    assert!(fixture.log.contains("Changed macro 'A' from CC 35 to CC 11."));
    Ok(())
}

#[test]
fn replace_mod_wheel_with_macro() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Cutoff", 91, 365).cc(31),
                MacroSpec::continuous("Resonance", 242, 365).cc(32),
                MacroSpec::continuous("Vibrato", 393, 365).cc(1).cc(33),
                MacroSpec::toggle("Mono", 544, 365).cc(112),
            ],
        )
        .effect("Chorus", "Chorus", &[("@MIDI CC 1", "Depth")]),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::ReplaceModWheelWithMacro, &path)?;

    let program = Program::read(&path)?;
    let wheel = &program.macros()[3];
    assert!(wheel.is_wheel());
    assert_eq!("Macro 5", wheel.name());
    assert_eq!(0.0, wheel.value());
    assert_eq!(
        vec![
            ("Cutoff".to_string(), Some(31), 91, 250),
            ("Resonance".to_string(), Some(32), 242, 250),
            ("Vibrato".to_string(), Some(33), 393, 250),
            ("Wheel".to_string(), Some(34), 544, 250),
            ("Mono".to_string(), Some(112), 91, 365),
        ],
        macro_summary(&program)
    );
    let wheel_source = ModulationSource::Macro("Macro 5".to_string());
    assert_eq!(&wheel_source, program.effects()[0].modulations()[0].source());
    assert!(program.macros()[2].modulations()[0].is_from_macro("Macro 5"));
    assert!(program.is_wheel_modulated(2));
    assert!(fixture.log.contains("in place of the mod wheel for macro 'Vibrato', Chorus 'Chorus'."));

    let before = fs::read(&path)?;
    fixture.run(ConfigTask::ReplaceModWheelWithMacro, &path)?;
    assert_eq!(before, fs::read(&path)?);
    assert!(fixture.log.contains("already has a Wheel macro"));
    Ok(())
}

#[test]
fn mod_wheel_controlling_one_macro_is_kept() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Cutoff", 91, 365).cc(31),
                MacroSpec::continuous("Vibrato", 242, 365).cc(1),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );
    let before = fs::read(&path)?;

    fixture.run(ConfigTask::ReplaceModWheelWithMacro, &path)?;
    assert_eq!(before, fs::read(&path)?);
    assert!(fixture.log.contains("already fully controls a single macro"));
    Ok(())
}

#[test]
fn reuse_cc1_with_touch_strip_ranges() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?.with_midi(MidiForMacros::new(
        34,
        vec![CcRange::new(31, 34), CcRange::new(11, 11), CcRange::new(36, 46)],
        vec![CcRange::new(112, 119)],
    ));
    let at = |name: &str, x: i32, cc: u8| MacroSpec::continuous(name, x, 365).cc(cc);
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                at("A", 10, 31),
                at("B", 100, 32),
                at("C", 200, 33),
                at("Wheel", 300, 34),
                at("D", 400, 11),
                at("E", 500, 36),
                at("F", 600, 37),
            ],
        ),
        "Pulsar",
        "Leads",
        "Strip",
    );

    fixture.run(ConfigTask::UpdateMacroCcs, &path)?;
    let before_reuse = fs::read(&path)?;
    assert!(!fixture.log.contains("Macro CCs"));

    fixture.run(ConfigTask::ReuseCc1, &path)?;
    let program = Program::read(&path)?;
    let ccs: Vec<Option<u8>> = program.macros().iter().map(|m| m.cc()).collect();
    assert_eq!(
        vec![Some(31), Some(32), Some(33), Some(34), None, Some(11), Some(36)],
        ccs
    );
    assert!(program.macros()[4].is_modulated_by_mod_wheel());
    assert_ne!(before_reuse, fs::read(&path)?);

    let after_reuse = fs::read(&path)?;
    fixture.run(ConfigTask::ReuseCc1, &path)?;
    fixture.run(ConfigTask::UpdateMacroCcs, &path)?;
    assert_eq!(after_reuse, fs::read(&path)?);
    Ok(())
}

#[test]
fn reuse_cc1_needs_the_mod_wheel_replaced() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("A", 10, 365).cc(34),
                MacroSpec::continuous("B", 100, 365).cc(35),
                MacroSpec::continuous("Vibrato", 200, 365).cc(1),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );
    let before = fs::read(&path)?;

    fixture.run(ConfigTask::QueryReuseCc1NotSupported, &path)?;
    fixture.run(ConfigTask::ReuseCc1, &path)?;
    assert_eq!(before, fs::read(&path)?);
    assert!(fixture.log.contains("Run ReplaceModWheelWithMacro first"));
    Ok(())
}

#[test]
fn remove_delay_effects_and_macros() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Cutoff", 91, 365).cc(31),
                MacroSpec::continuous("Delay Mix", 242, 365).cc(32),
                MacroSpec::continuous("Reverb", 393, 365).cc(33),
            ],
        )
        .effect("DualDelay", "Delay", &[("$Program/Macro 2", "Mix")])
        .effect("SparkVerb", "Reverb", &[("$Program/Macro 3", "Mix")]),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::RemoveDelayEffectsAndMacros, &path)?;

    let program = Program::read(&path)?;
    assert_eq!(
        vec![
            ("Cutoff".to_string(), Some(31), 91, 365),
            ("Reverb".to_string(), Some(32), 242, 365),
        ],
        macro_summary(&program)
    );
    assert!(program.effects()[0].is_bypassed());
    assert!(program.effects()[0].modulations().is_empty());
    assert!(!program.effects()[1].is_bypassed());
    assert_eq!(1, program.effects()[1].modulations().len());

    let before = fs::read(&path)?;
    fixture.run(ConfigTask::RemoveDelayEffectsAndMacros, &path)?;
    assert_eq!(before, fs::read(&path)?);
    Ok(())
}

#[test]
fn initialise_values_and_move_macros() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Release", 91, 365).cc(31),
                MacroSpec::continuous("Cutoff", 242, 365).cc(32),
                MacroSpec::continuous("Reverb", 393, 365).cc(33).value(0.3),
                MacroSpec::continuous("Drive", 544, 365).cc(34),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::InitialiseValuesAndMoveMacros, &path)?;

    let program = Program::read(&path)?;
    assert_eq!(
        vec![
            ("Cutoff".to_string(), Some(31), 91, 365),
            ("Drive".to_string(), Some(32), 242, 365),
            ("Release".to_string(), Some(33), 393, 365),
            ("Reverb".to_string(), Some(34), 544, 365),
        ],
        macro_summary(&program)
    );
    assert_eq!(0.0, program.macros()[2].value());
    assert_eq!(0.0, program.macros()[3].value());

    let before = fs::read(&path)?;
    fixture.run(ConfigTask::InitialiseValuesAndMoveMacros, &path)?;
    assert_eq!(before, fs::read(&path)?);
    Ok(())
}

#[test]
fn reverb_exception_and_wheel_modulated_macros() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?.with_exceptions(Exceptions {
        do_not_zero_reverb: vec![Exception::sound_bank("Pulsar")],
        ..Exceptions::default()
    });
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Reverb", 91, 365).cc(31),
                MacroSpec::continuous("Release", 242, 365).cc(1),
            ],
        ),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::ZeroReverbMacros, &path)?;
    fixture.run(ConfigTask::ZeroReleaseMacro, &path)?;

    let program = Program::read(&path)?;
    assert_eq!(0.5, program.macros()[0].value());
    assert_eq!(0.5, program.macros()[1].value());
    assert!(fixture.log.contains("Reverb is not zeroed"));
    assert!(fixture.log.contains("the mod wheel drives it"));
    Ok(())
}

#[test]
fn remove_arpeggiators_and_sequencing() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Cutoff", 242, 365).cc(32),
                MacroSpec::continuous("Arp Rate", 91, 365).cc(31),
                MacroSpec::continuous("Unused", 393, 365).cc(33),
            ],
        )
        .driven_script_processor("Arpeggiator", "./Scripts/Arp.lua", &[("$Program/Macro 2", "rate")])
        .driven_script_processor("Harp Tuning", "./Scripts/Tuning.lua", &[("$Program/Macro 1", "tune")])
        .layer("Pad", Some("StepSequencer")),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::RemoveArpeggiatorsAndSequencing, &path)?;

    let program = Program::read(&path)?;
    let names: Vec<&str> = program.script_processors().iter().map(|s| s.name()).collect();
    assert_eq!(vec!["Harp Tuning"], names);
    let macros: Vec<String> = macro_summary(&program)
        .into_iter()
        .map(|(name, cc, x, _)| format!("{}:{:?}@{}", name, cc, x))
        .collect();
    assert_eq!(vec!["Cutoff:Some(31)@91", "Unused:Some(32)@242"], macros);
    Ok(())
}

#[test]
fn prepend_path_line_once() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new("Pulsar", vec![]).property("Description", "Warm and wide"),
        "Pulsar",
        "Leads",
        "Soft",
    );

    fixture.run(ConfigTask::PrependPathLineToDescription, &path)?;
    let before = fs::read(&path)?;
    fixture.run(ConfigTask::PrependPathLineToDescription, &path)?;
    assert_eq!(before, fs::read(&path)?);
    assert_eq!(
        "PATH: Pulsar\\Leads\nWarm and wide",
        Program::read(&path)?.description()
    );
    Ok(())
}

#[test]
fn queries_leave_programs_alone() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let path = fixture.write(
        &ProgramSpec::new(
            "Pulsar",
            vec![
                MacroSpec::continuous("Attack", 91, 365).value(0.25),
                MacroSpec::continuous("Release", 242, 365),
                MacroSpec::continuous("Hidden", 700, 365),
            ],
        )
        .effect("DualDelay", "Delay", &[])
        .effect("SparkVerb", "Hall", &[])
        .dahdsr("Amp Env", &[("$Program/Macro 1", "AttackTime")]),
        "Pulsar",
        "Leads",
        "Soft",
    );
    let before = fs::read(&path)?;

    for task in [
        ConfigTask::QueryAdsrMacros,
        ConfigTask::QueryDahdsrModulations,
        ConfigTask::QueryDelayTypes,
        ConfigTask::QueryReverbTypes,
        ConfigTask::QueryCountMacros,
        ConfigTask::QueryReuseCc1NotSupported,
    ] {
        fixture.run(task, &path)?;
    }

    assert_eq!(before, fs::read(&path)?);
    assert!(fixture.log.contains("ADSR macros: Attack=0.25, Release=0.5."));
    assert!(fixture.log.contains("DAHDSR 'Amp Env' modulated by $Program/Macro 1 (AttackTime x1)."));
    assert!(fixture.log.contains("Delay effects: DualDelay 'Delay'."));
    assert!(fixture.log.contains("Reverb effects: SparkVerb 'Hall'."));
    assert!(fixture.log.contains("3 macros, 2 visible."));
    assert!(fixture.log.contains("ReuseCc1 is not supported: no visible macro uses CC 34."));
    Ok(())
}

#[test]
fn standard_pipeline_is_idempotent() -> Result<(), Box<dyn Error>> {
    let fixture = Fixture::new()?;
    let spec = ProgramSpec::new(
        "Pulsar",
        vec![
            MacroSpec::toggle("Mono", 500, 120).cc_with_ratio(40, -1.0),
            MacroSpec::continuous("Cutoff", 30, 100).cc(50),
            MacroSpec::continuous("Resonance", 200, 110),
            MacroSpec::continuous("Drive", 30, 300).cc(1),
            MacroSpec::continuous("Stacked", 600, 300),
            MacroSpec::continuous("Stacked Too", 600, 300),
        ],
    )
    .script_processor("GuiScript", "./Gui.lua", &[(50, "cutoff")]);
    spec.write(&fixture.settings.folders().original_programs, "Pulsar", "Leads", "Soft");
    let path = fixture.settings.folders().programs.join("Pulsar").join("Leads").join("Soft.uvip");

    let pipeline = [
        ConfigTask::RestoreOriginal,
        ConfigTask::InitialiseLayout,
        ConfigTask::UpdateMacroCcs,
    ];
    for task in pipeline {
        fixture.run(task, &path)?;
    }
    let first = fs::read(&path)?;
    for task in pipeline {
        fixture.run(task, &path)?;
    }
    assert_eq!(first, fs::read(&path)?);

    let program = Program::read(&path)?;
    let ccs: Vec<(String, Option<u8>)> = program
        .macros()
        .iter()
        .map(|m| (m.display_name().to_string(), m.cc()))
        .collect();
    assert_eq!(
        vec![
            ("Cutoff".to_string(), Some(31)),
            ("Resonance".to_string(), Some(32)),
            ("Mono".to_string(), Some(112)),
            ("Drive".to_string(), None),
            ("Stacked".to_string(), None),
            ("Stacked Too".to_string(), None),
        ],
        ccs
    );
    assert_eq!((600, 300), (program.macros()[4].x(), program.macros()[4].y()));
    assert_eq!(1.0, program.macros()[2].modulations()[0].ratio());
    Ok(())
}
