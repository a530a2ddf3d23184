use std::fmt::Display;

use crate::cv::{self, TermCategory};
use crate::impl_param_described;
use crate::params::{Param, ParamDescribed, ParamList};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentType {
    Analyzer,
    IonSource,
    Detector,
    #[default]
    Unknown,
}

/// A description of a combination of parts that are described as part of an [`InstrumentConfiguration`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// The kind of component this is
    pub component_type: ComponentType,
    /// The order in the sequence of components that the analytes interact with
    pub order: u8,
    pub params: ParamList,
}

impl Component {
    pub fn new(component_type: ComponentType, order: u8, params: ParamList) -> Self {
        Self {
            component_type,
            order,
            params,
        }
    }

    /// The name of the first parameter belonging to `category`
    pub fn term_name_of(&self, category: TermCategory) -> Option<&'static str> {
        self.params
            .iter()
            .find_map(|p| cv::member_term(p.accession, category))
            .map(|t| t.name)
    }
}

/// A series of mass spectrometer components that together were engaged to acquire a mass spectrum
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentConfiguration {
    /// The set of components involved
    pub components: Vec<Component>,
    /// Additional parameters describing this configuration, like the model and serial number
    pub params: ParamList,
    /// A unique identifier translated to an ordinal identifying this configuration
    pub id: u32,
}

impl InstrumentConfiguration {
    /// The instrument model name.
    ///
    /// An `instrument model` parameter carrying a free-text value wins over a
    /// named model term.
    pub fn model(&self) -> String {
        let custom = self.get_value(cv::INSTRUMENT_MODEL);
        if !custom.is_empty() {
            return custom.to_string();
        }
        self.params
            .iter()
            .find_map(|p| cv::member_term(p.accession, TermCategory::InstrumentModel))
            .map(|t| t.name.to_string())
            .unwrap_or_default()
    }

    pub fn serial_number(&self) -> &str {
        self.get_value(cv::INSTRUMENT_SERIAL_NUMBER)
    }

    fn component_term(&self, component_type: ComponentType, category: TermCategory) -> String {
        self.components
            .iter()
            .filter(|c| c.component_type == component_type)
            .find_map(|c| c.term_name_of(category))
            .unwrap_or_default()
            .to_string()
    }

    /// Resolve the model and the component names into an [`InstrumentDescription`]
    pub fn describe(&self) -> InstrumentDescription {
        InstrumentDescription {
            model: self.model(),
            analyzer: self.component_term(ComponentType::Analyzer, TermCategory::MassAnalyzer),
            detector: self.component_term(ComponentType::Detector, TermCategory::Detector),
            ionization: self.component_term(ComponentType::IonSource, TermCategory::Ionization),
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }
}

/// The names of the parts of one instrument configuration. Unknown parts are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentDescription {
    pub model: String,
    pub analyzer: String,
    pub detector: String,
    pub ionization: String,
}

impl Display for InstrumentDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}; {}; {}]",
            self.model, self.ionization, self.analyzer, self.detector
        )
    }
}

impl_param_described!(InstrumentConfiguration, Component);

#[cfg(test)]
mod test {
    use super::*;

    fn velos() -> InstrumentConfiguration {
        InstrumentConfiguration::default()
            .with_param(Param::flag(1001742))
            .with_param(Param::new(cv::INSTRUMENT_SERIAL_NUMBER, "VP10089"))
            .with_component(Component::new(
                ComponentType::IonSource,
                0,
                vec![Param::flag(1000398), Param::flag(1000485)],
            ))
            .with_component(Component::new(
                ComponentType::Analyzer,
                1,
                vec![Param::flag(1000484)],
            ))
            .with_component(Component::new(
                ComponentType::Detector,
                2,
                vec![Param::flag(1000624)],
            ))
    }

    #[test]
    fn test_describe() {
        let config = velos();
        let descr = config.describe();
        assert_eq!(descr.model, "LTQ Orbitrap Velos");
        assert_eq!(descr.analyzer, "orbitrap");
        assert_eq!(descr.detector, "inductive detector");
        assert_eq!(descr.ionization, "nanoelectrospray");
        assert_eq!(config.serial_number(), "VP10089");
        assert_eq!(
            descr.to_string(),
            "LTQ Orbitrap Velos [nanoelectrospray; orbitrap; inductive detector]"
        );
    }

    #[test]
    fn test_custom_model_and_missing_parts() {
        let config = InstrumentConfiguration::default()
            .with_param(Param::new(cv::INSTRUMENT_MODEL, "Agilent 6560"));
        let descr = config.describe();
        assert_eq!(descr.model, "Agilent 6560");
        assert_eq!(descr.analyzer, "");
        assert_eq!(config.serial_number(), "");
    }

    #[test]
    fn test_parent_terms_are_skipped() {
        let config = InstrumentConfiguration::default()
            .with_param(Param::flag(cv::INSTRUMENT_MODEL))
            .with_param(Param::flag(1001742))
            .with_component(Component::new(
                ComponentType::Analyzer,
                1,
                vec![Param::flag(cv::MASS_ANALYZER_TYPE), Param::flag(1000484)],
            ))
            .with_component(Component::new(
                ComponentType::Detector,
                2,
                vec![Param::flag(cv::DETECTOR_TYPE)],
            ))
            .with_component(Component::new(
                ComponentType::IonSource,
                0,
                vec![Param::flag(cv::IONIZATION_TYPE), Param::flag(1000073)],
            ));
        let descr = config.describe();
        assert_eq!(descr.model, "LTQ Orbitrap Velos");
        assert_eq!(descr.analyzer, "orbitrap");
        assert_eq!(descr.detector, "");
        assert_eq!(descr.ionization, "electrospray ionization");
    }
}
