//! Fault Condition Catalog
//!
//! One constructor per ASHRAE Guideline 36 fault condition (fc1-fc3 and
//! fc5-fc13; fc4 is [`crate::hunting::HuntingRule`]). Each takes a
//! named-parameter config, validates it, and assembles a generic
//! [`FaultRule`] - adding a fault code is a configuration change, not a new
//! rule type.
//!
//! Threshold defaults follow common commissioning practice: 5 degF outdoor
//! and mixed-air tolerances, 2 degF return and supply tolerances, 0.1 inch
//! duct static tolerance, 2 degF fan heat rise.

use crate::config::{check_analog_level, check_column, check_threshold, ConfigError};
use crate::modes::{ModeConfig, OperatingMode};
use crate::predicate::{col, CmpOp, Comparison, Expr, Predicate};
use crate::rule::{FaultRule, ModeGate};
use serde::{Deserialize, Serialize};

/// fc1: duct static pressure stays below setpoint with the supply fan
/// running at its speed limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuctStaticConfig {
    pub duct_static_col: String,
    pub duct_static_setpoint_col: String,
    pub supply_vfd_speed_col: String,
    /// Duct static pressure tolerance, inches WC
    pub duct_static_inches_err_thres: f64,
    /// VFD speed tolerance, 0-1
    pub vfd_speed_percent_err_thres: f64,
    /// VFD speed limit, 0-1
    pub vfd_speed_percent_max: f64,
}

impl Default for DuctStaticConfig {
    fn default() -> Self {
        Self {
            duct_static_col: "duct_static".to_string(),
            duct_static_setpoint_col: "duct_static_setpoint".to_string(),
            supply_vfd_speed_col: "supply_vfd_speed".to_string(),
            duct_static_inches_err_thres: 0.1,
            vfd_speed_percent_err_thres: 0.05,
            vfd_speed_percent_max: 0.99,
        }
    }
}

pub fn fault_condition_one(cfg: DuctStaticConfig) -> Result<FaultRule, ConfigError> {
    check_column("duct_static_col", &cfg.duct_static_col)?;
    check_column("duct_static_setpoint_col", &cfg.duct_static_setpoint_col)?;
    check_column("supply_vfd_speed_col", &cfg.supply_vfd_speed_col)?;
    check_threshold("duct_static_inches_err_thres", cfg.duct_static_inches_err_thres)?;
    check_threshold("vfd_speed_percent_err_thres", cfg.vfd_speed_percent_err_thres)?;
    check_analog_level("vfd_speed_percent_max", cfg.vfd_speed_percent_max)?;

    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.duct_static_col),
            CmpOp::Lt,
            col(&cfg.duct_static_setpoint_col).minus(cfg.duct_static_inches_err_thres),
        ),
        Comparison::new(
            col(&cfg.supply_vfd_speed_col),
            CmpOp::Gt,
            cfg.vfd_speed_percent_max - cfg.vfd_speed_percent_err_thres,
        ),
    ]);
    Ok(FaultRule::new(
        "fc1",
        predicate,
        vec![cfg.supply_vfd_speed_col],
        None,
    ))
}

/// fc2/fc3: mixed-air temperature outside the envelope spanned by return
/// and outside air. The mixing box can only blend the two streams, so MAT
/// below both (fc2) or above both (fc3) beyond tolerance means a bad sensor
/// or stuck damper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedAirTempConfig {
    pub mat_col: String,
    pub rat_col: String,
    pub oat_col: String,
    pub supply_vfd_speed_col: String,
    /// Mixed-air temperature tolerance, degF
    pub mix_degf_err_thres: f64,
    /// Return-air temperature tolerance, degF
    pub return_degf_err_thres: f64,
    /// Outside-air temperature tolerance, degF
    pub outdoor_degf_err_thres: f64,
}

impl Default for MixedAirTempConfig {
    fn default() -> Self {
        Self {
            mat_col: "mat".to_string(),
            rat_col: "rat".to_string(),
            oat_col: "oat".to_string(),
            supply_vfd_speed_col: "supply_vfd_speed".to_string(),
            mix_degf_err_thres: 5.0,
            return_degf_err_thres: 2.0,
            outdoor_degf_err_thres: 5.0,
        }
    }
}

impl MixedAirTempConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_column("mat_col", &self.mat_col)?;
        check_column("rat_col", &self.rat_col)?;
        check_column("oat_col", &self.oat_col)?;
        check_column("supply_vfd_speed_col", &self.supply_vfd_speed_col)?;
        check_threshold("mix_degf_err_thres", self.mix_degf_err_thres)?;
        check_threshold("return_degf_err_thres", self.return_degf_err_thres)?;
        check_threshold("outdoor_degf_err_thres", self.outdoor_degf_err_thres)
    }
}

/// Mixed-air temperature too low (fc2)
pub fn fault_condition_two(cfg: MixedAirTempConfig) -> Result<FaultRule, ConfigError> {
    cfg.validate()?;
    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.mat_col).plus(cfg.mix_degf_err_thres),
            CmpOp::Lt,
            col(&cfg.rat_col)
                .minus(cfg.return_degf_err_thres)
                .min(col(&cfg.oat_col).minus(cfg.outdoor_degf_err_thres)),
        ),
        Comparison::new(col(&cfg.supply_vfd_speed_col), CmpOp::Gt, 0.0),
    ]);
    Ok(FaultRule::new(
        "fc2",
        predicate,
        vec![cfg.supply_vfd_speed_col],
        None,
    ))
}

/// Mixed-air temperature too high (fc3)
pub fn fault_condition_three(cfg: MixedAirTempConfig) -> Result<FaultRule, ConfigError> {
    cfg.validate()?;
    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.mat_col).minus(cfg.mix_degf_err_thres),
            CmpOp::Gt,
            col(&cfg.rat_col)
                .plus(cfg.return_degf_err_thres)
                .max(col(&cfg.oat_col).plus(cfg.outdoor_degf_err_thres)),
        ),
        Comparison::new(col(&cfg.supply_vfd_speed_col), CmpOp::Gt, 0.0),
    ]);
    Ok(FaultRule::new(
        "fc3",
        predicate,
        vec![cfg.supply_vfd_speed_col],
        None,
    ))
}

/// fc5: supply-air temperature not rising above mixed air plus the fan heat
/// while the heating valve is open - the heating coil is not doing its job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyTempHeatingConfig {
    pub sat_col: String,
    pub mat_col: String,
    pub heating_sig_col: String,
    pub supply_vfd_speed_col: String,
    pub supply_degf_err_thres: f64,
    pub mix_degf_err_thres: f64,
    /// Temperature rise across the supply fan, degF
    pub delta_t_supply_fan: f64,
}

impl Default for SupplyTempHeatingConfig {
    fn default() -> Self {
        Self {
            sat_col: "sat".to_string(),
            mat_col: "mat".to_string(),
            heating_sig_col: "heating_sig".to_string(),
            supply_vfd_speed_col: "supply_vfd_speed".to_string(),
            supply_degf_err_thres: 2.0,
            mix_degf_err_thres: 5.0,
            delta_t_supply_fan: 2.0,
        }
    }
}

pub fn fault_condition_five(cfg: SupplyTempHeatingConfig) -> Result<FaultRule, ConfigError> {
    check_column("sat_col", &cfg.sat_col)?;
    check_column("mat_col", &cfg.mat_col)?;
    check_column("heating_sig_col", &cfg.heating_sig_col)?;
    check_column("supply_vfd_speed_col", &cfg.supply_vfd_speed_col)?;
    check_threshold("supply_degf_err_thres", cfg.supply_degf_err_thres)?;
    check_threshold("mix_degf_err_thres", cfg.mix_degf_err_thres)?;
    check_threshold("delta_t_supply_fan", cfg.delta_t_supply_fan)?;

    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.sat_col).plus(cfg.supply_degf_err_thres),
            CmpOp::Lt,
            col(&cfg.mat_col)
                .minus(cfg.mix_degf_err_thres)
                .plus(cfg.delta_t_supply_fan),
        ),
        Comparison::new(col(&cfg.heating_sig_col), CmpOp::Gt, 0.0),
        Comparison::new(col(&cfg.supply_vfd_speed_col), CmpOp::Gt, 0.0),
    ]);
    Ok(FaultRule::new(
        "fc5",
        predicate,
        vec![cfg.heating_sig_col, cfg.supply_vfd_speed_col],
        None,
    ))
}

/// fc6: actual outside-air fraction (MAT-RAT)/(OAT-RAT) deviating from the
/// design minimum fraction while the unit should be holding minimum outside
/// air (heating-only or mech-cooling-only mode). Needs a usable RAT-OAT
/// spread; rows without one cannot flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsideAirFractionConfig {
    pub mat_col: String,
    pub rat_col: String,
    pub oat_col: String,
    /// Total supply airflow column, CFM
    pub vav_total_flow_col: String,
    /// Outside-air fraction tolerance, 0-1
    pub airflow_err_thres: f64,
    /// Design minimum outside airflow, CFM
    pub ahu_min_oa_cfm_design: f64,
    /// Minimum usable |RAT - OAT| spread, degF
    pub oat_rat_delta_min: f64,
    pub mode: ModeConfig,
}

impl Default for OutsideAirFractionConfig {
    fn default() -> Self {
        Self {
            mat_col: "mat".to_string(),
            rat_col: "rat".to_string(),
            oat_col: "oat".to_string(),
            vav_total_flow_col: "vav_total_flow".to_string(),
            airflow_err_thres: 0.3,
            ahu_min_oa_cfm_design: 2500.0,
            oat_rat_delta_min: 10.0,
            mode: ModeConfig::default(),
        }
    }
}

pub fn fault_condition_six(cfg: OutsideAirFractionConfig) -> Result<FaultRule, ConfigError> {
    check_column("mat_col", &cfg.mat_col)?;
    check_column("rat_col", &cfg.rat_col)?;
    check_column("oat_col", &cfg.oat_col)?;
    check_column("vav_total_flow_col", &cfg.vav_total_flow_col)?;
    check_threshold("airflow_err_thres", cfg.airflow_err_thres)?;
    check_threshold("ahu_min_oa_cfm_design", cfg.ahu_min_oa_cfm_design)?;
    check_threshold("oat_rat_delta_min", cfg.oat_rat_delta_min)?;
    cfg.mode.validate()?;

    let measured_fraction = col(&cfg.mat_col)
        .minus(col(&cfg.rat_col))
        .div(col(&cfg.oat_col).minus(col(&cfg.rat_col)));
    let design_fraction = Expr::Const(cfg.ahu_min_oa_cfm_design).div(col(&cfg.vav_total_flow_col));
    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.rat_col).abs_diff(col(&cfg.oat_col)),
            CmpOp::Ge,
            cfg.oat_rat_delta_min,
        ),
        Comparison::new(
            measured_fraction.abs_diff(design_fraction),
            CmpOp::Gt,
            cfg.airflow_err_thres,
        ),
    ]);
    Ok(FaultRule::new(
        "fc6",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::HeatingOnly, OperatingMode::MechOnly],
        }),
    ))
}

/// fc7: supply-air temperature stuck below setpoint with the heating valve
/// saturated open - the coil has run out of capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyTempSetpointConfig {
    pub sat_col: String,
    pub satsp_col: String,
    pub heating_sig_col: String,
    pub supply_vfd_speed_col: String,
    pub supply_degf_err_thres: f64,
    /// Valve position treated as saturated open, 0-1
    pub htg_vlv_open_min: f64,
}

impl Default for SupplyTempSetpointConfig {
    fn default() -> Self {
        Self {
            sat_col: "sat".to_string(),
            satsp_col: "satsp".to_string(),
            heating_sig_col: "heating_sig".to_string(),
            supply_vfd_speed_col: "supply_vfd_speed".to_string(),
            supply_degf_err_thres: 2.0,
            htg_vlv_open_min: 0.99,
        }
    }
}

pub fn fault_condition_seven(cfg: SupplyTempSetpointConfig) -> Result<FaultRule, ConfigError> {
    check_column("sat_col", &cfg.sat_col)?;
    check_column("satsp_col", &cfg.satsp_col)?;
    check_column("heating_sig_col", &cfg.heating_sig_col)?;
    check_column("supply_vfd_speed_col", &cfg.supply_vfd_speed_col)?;
    check_threshold("supply_degf_err_thres", cfg.supply_degf_err_thres)?;
    check_analog_level("htg_vlv_open_min", cfg.htg_vlv_open_min)?;

    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.sat_col),
            CmpOp::Lt,
            col(&cfg.satsp_col).minus(cfg.supply_degf_err_thres),
        ),
        Comparison::new(col(&cfg.heating_sig_col), CmpOp::Ge, cfg.htg_vlv_open_min),
        Comparison::new(col(&cfg.supply_vfd_speed_col), CmpOp::Gt, 0.0),
    ]);
    Ok(FaultRule::new(
        "fc7",
        predicate,
        vec![cfg.heating_sig_col, cfg.supply_vfd_speed_col],
        None,
    ))
}

/// fc8: in economizer-only mode the coils are idle, so supply air (less the
/// fan heat) should track mixed air within the root-sum-square of the two
/// sensor tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconSupplyMixConfig {
    pub sat_col: String,
    pub mat_col: String,
    pub supply_degf_err_thres: f64,
    pub mix_degf_err_thres: f64,
    pub delta_t_supply_fan: f64,
    pub mode: ModeConfig,
}

impl Default for EconSupplyMixConfig {
    fn default() -> Self {
        Self {
            sat_col: "sat".to_string(),
            mat_col: "mat".to_string(),
            supply_degf_err_thres: 2.0,
            mix_degf_err_thres: 5.0,
            delta_t_supply_fan: 2.0,
            mode: ModeConfig::default(),
        }
    }
}

pub fn fault_condition_eight(cfg: EconSupplyMixConfig) -> Result<FaultRule, ConfigError> {
    check_column("sat_col", &cfg.sat_col)?;
    check_column("mat_col", &cfg.mat_col)?;
    check_threshold("supply_degf_err_thres", cfg.supply_degf_err_thres)?;
    check_threshold("mix_degf_err_thres", cfg.mix_degf_err_thres)?;
    check_threshold("delta_t_supply_fan", cfg.delta_t_supply_fan)?;
    cfg.mode.validate()?;

    let tolerance = cfg
        .supply_degf_err_thres
        .hypot(cfg.mix_degf_err_thres);
    let predicate = Predicate::all(vec![Comparison::new(
        col(&cfg.sat_col)
            .minus(cfg.delta_t_supply_fan)
            .abs_diff(col(&cfg.mat_col)),
        CmpOp::Gt,
        tolerance,
    )]);
    Ok(FaultRule::new(
        "fc8",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconOnly],
        }),
    ))
}

/// fc9/fc11: outside-air temperature unsuitable for the economizer mode the
/// unit is in - too warm for free cooling alone (fc9) or too cold to be
/// running mechanical cooling with the damper open (fc11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconOutsideTempConfig {
    pub oat_col: String,
    pub satsp_col: String,
    pub outdoor_degf_err_thres: f64,
    pub supply_degf_err_thres: f64,
    pub delta_t_supply_fan: f64,
    pub mode: ModeConfig,
}

impl Default for EconOutsideTempConfig {
    fn default() -> Self {
        Self {
            oat_col: "oat".to_string(),
            satsp_col: "satsp".to_string(),
            outdoor_degf_err_thres: 5.0,
            supply_degf_err_thres: 2.0,
            delta_t_supply_fan: 2.0,
            mode: ModeConfig::default(),
        }
    }
}

impl EconOutsideTempConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_column("oat_col", &self.oat_col)?;
        check_column("satsp_col", &self.satsp_col)?;
        check_threshold("outdoor_degf_err_thres", self.outdoor_degf_err_thres)?;
        check_threshold("supply_degf_err_thres", self.supply_degf_err_thres)?;
        check_threshold("delta_t_supply_fan", self.delta_t_supply_fan)?;
        self.mode.validate()
    }
}

/// Outside air too warm for economizer-only cooling (fc9)
pub fn fault_condition_nine(cfg: EconOutsideTempConfig) -> Result<FaultRule, ConfigError> {
    cfg.validate()?;
    let predicate = Predicate::all(vec![Comparison::new(
        col(&cfg.oat_col).minus(cfg.outdoor_degf_err_thres),
        CmpOp::Gt,
        col(&cfg.satsp_col)
            .minus(cfg.delta_t_supply_fan)
            .plus(cfg.supply_degf_err_thres),
    )]);
    Ok(FaultRule::new(
        "fc9",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconOnly],
        }),
    ))
}

/// Outside air too cold for economizer plus mechanical cooling (fc11)
pub fn fault_condition_eleven(cfg: EconOutsideTempConfig) -> Result<FaultRule, ConfigError> {
    cfg.validate()?;
    let predicate = Predicate::all(vec![Comparison::new(
        col(&cfg.oat_col).plus(cfg.outdoor_degf_err_thres),
        CmpOp::Lt,
        col(&cfg.satsp_col)
            .minus(cfg.delta_t_supply_fan)
            .minus(cfg.supply_degf_err_thres),
    )]);
    Ok(FaultRule::new(
        "fc11",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconPlusMech],
        }),
    ))
}

/// fc10: with the damper fully modulating for cooling, mixed air is mostly
/// outside air - the two sensors should agree within RSS tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsideMixMatchConfig {
    pub mat_col: String,
    pub oat_col: String,
    pub outdoor_degf_err_thres: f64,
    pub mix_degf_err_thres: f64,
    pub mode: ModeConfig,
}

impl Default for OutsideMixMatchConfig {
    fn default() -> Self {
        Self {
            mat_col: "mat".to_string(),
            oat_col: "oat".to_string(),
            outdoor_degf_err_thres: 5.0,
            mix_degf_err_thres: 5.0,
            mode: ModeConfig::default(),
        }
    }
}

pub fn fault_condition_ten(cfg: OutsideMixMatchConfig) -> Result<FaultRule, ConfigError> {
    check_column("mat_col", &cfg.mat_col)?;
    check_column("oat_col", &cfg.oat_col)?;
    check_threshold("outdoor_degf_err_thres", cfg.outdoor_degf_err_thres)?;
    check_threshold("mix_degf_err_thres", cfg.mix_degf_err_thres)?;
    cfg.mode.validate()?;

    let tolerance = cfg.outdoor_degf_err_thres.hypot(cfg.mix_degf_err_thres);
    let predicate = Predicate::all(vec![Comparison::new(
        col(&cfg.mat_col).abs_diff(col(&cfg.oat_col)),
        CmpOp::Gt,
        tolerance,
    )]);
    Ok(FaultRule::new(
        "fc10",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconPlusMech],
        }),
    ))
}

/// fc12: supply air warmer than mixed air while cooling - impossible unless
/// a sensor lies or the heating coil leaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyAboveMixConfig {
    pub sat_col: String,
    pub mat_col: String,
    pub supply_degf_err_thres: f64,
    pub mix_degf_err_thres: f64,
    pub delta_t_supply_fan: f64,
    pub mode: ModeConfig,
}

impl Default for SupplyAboveMixConfig {
    fn default() -> Self {
        Self {
            sat_col: "sat".to_string(),
            mat_col: "mat".to_string(),
            supply_degf_err_thres: 2.0,
            mix_degf_err_thres: 5.0,
            delta_t_supply_fan: 2.0,
            mode: ModeConfig::default(),
        }
    }
}

pub fn fault_condition_twelve(cfg: SupplyAboveMixConfig) -> Result<FaultRule, ConfigError> {
    check_column("sat_col", &cfg.sat_col)?;
    check_column("mat_col", &cfg.mat_col)?;
    check_threshold("supply_degf_err_thres", cfg.supply_degf_err_thres)?;
    check_threshold("mix_degf_err_thres", cfg.mix_degf_err_thres)?;
    check_threshold("delta_t_supply_fan", cfg.delta_t_supply_fan)?;
    cfg.mode.validate()?;

    let predicate = Predicate::all(vec![Comparison::new(
        col(&cfg.sat_col)
            .minus(cfg.supply_degf_err_thres)
            .minus(cfg.delta_t_supply_fan),
        CmpOp::Gt,
        col(&cfg.mat_col).plus(cfg.mix_degf_err_thres),
    )]);
    Ok(FaultRule::new(
        "fc12",
        predicate,
        Vec::new(),
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconPlusMech, OperatingMode::MechOnly],
        }),
    ))
}

/// fc13: supply air above setpoint with the cooling valve saturated open -
/// the cooling coil has run out of capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoolingSupplySetpointConfig {
    pub sat_col: String,
    pub satsp_col: String,
    pub cooling_sig_col: String,
    pub supply_degf_err_thres: f64,
    /// Valve position treated as saturated open, 0-1
    pub clg_vlv_open_min: f64,
    pub mode: ModeConfig,
}

impl Default for CoolingSupplySetpointConfig {
    fn default() -> Self {
        Self {
            sat_col: "sat".to_string(),
            satsp_col: "satsp".to_string(),
            cooling_sig_col: "cooling_sig".to_string(),
            supply_degf_err_thres: 2.0,
            clg_vlv_open_min: 0.99,
            mode: ModeConfig::default(),
        }
    }
}

pub fn fault_condition_thirteen(cfg: CoolingSupplySetpointConfig) -> Result<FaultRule, ConfigError> {
    check_column("sat_col", &cfg.sat_col)?;
    check_column("satsp_col", &cfg.satsp_col)?;
    check_column("cooling_sig_col", &cfg.cooling_sig_col)?;
    check_threshold("supply_degf_err_thres", cfg.supply_degf_err_thres)?;
    check_analog_level("clg_vlv_open_min", cfg.clg_vlv_open_min)?;
    cfg.mode.validate()?;

    let predicate = Predicate::all(vec![
        Comparison::new(
            col(&cfg.sat_col),
            CmpOp::Gt,
            col(&cfg.satsp_col).plus(cfg.supply_degf_err_thres),
        ),
        Comparison::new(col(&cfg.cooling_sig_col), CmpOp::Ge, cfg.clg_vlv_open_min),
    ]);
    Ok(FaultRule::new(
        "fc13",
        predicate,
        vec![cfg.cooling_sig_col],
        Some(ModeGate {
            config: cfg.mode,
            modes: vec![OperatingMode::EconPlusMech, OperatingMode::MechOnly],
        }),
    ))
}
