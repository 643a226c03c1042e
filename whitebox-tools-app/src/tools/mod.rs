pub mod core_interop;
pub mod hydro_analysis;
pub mod stream_network_analysis;

use whitebox_common::utils::get_formatted_elapsed_time;
use serde_json;
use std::io::{Error, ErrorKind};
use std::time::Instant;

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(
        working_directory: &'a str,
        verbose_mode: &'a bool,
    ) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];

        // hydro_analysis
        tool_names.push("D8Pointer".to_string());
        tool_names.push("TraceDownslopeFlowpaths".to_string());
        tool_names.push("DownslopeDistanceToStream".to_string());
        tool_names.push("DownslopeFlowpathLength".to_string());
        tool_names.push("AverageUpslopeFlowpathLength".to_string());
        tool_names.push("ElevationAboveStream".to_string());
        tool_names.push("Basins".to_string());
        tool_names.push("Subbasins".to_string());
        tool_names.push("Isobasins".to_string());

        // stream_network_analysis
        tool_names.push("ExtractStreams".to_string());
        tool_names.push("ExtractValleys".to_string());
        tool_names.push("RasterStreamsToVector".to_string());
        tool_names.push("VectorStreamNetworkAnalysis".to_string());
        tool_names.push("StrahlerOrder".to_string());
        tool_names.push("HackOrder".to_string());
        tool_names.push("FindMainStem".to_string());
        tool_names.push("LongProfile".to_string());
        tool_names.push("StreamSlopeContinuous".to_string());
        tool_names.push("DelineateReaches".to_string());

        Ok(ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names: tool_names,
        })
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn WhiteboxTool + 'static>> {
        match tool_name.to_lowercase().replace("_", "").as_ref() {
            // hydro_analysis
            "d8pointer" => Some(Box::new(hydro_analysis::D8Pointer::new())),
            "tracedownslopeflowpaths" => {
                Some(Box::new(hydro_analysis::TraceDownslopeFlowpaths::new()))
            }
            "downslopedistancetostream" => {
                Some(Box::new(hydro_analysis::DownslopeDistanceToStream::new()))
            }
            "downslopeflowpathlength" => {
                Some(Box::new(hydro_analysis::DownslopeFlowpathLength::new()))
            }
            "averageupslopeflowpathlength" => Some(Box::new(
                hydro_analysis::AverageUpslopeFlowpathLength::new(),
            )),
            "elevationabovestream" => Some(Box::new(hydro_analysis::ElevationAboveStream::new())),
            "basins" => Some(Box::new(hydro_analysis::Basins::new())),
            "subbasins" => Some(Box::new(hydro_analysis::Subbasins::new())),
            "isobasins" => Some(Box::new(hydro_analysis::Isobasins::new())),

            // stream_network_analysis
            "extractstreams" => Some(Box::new(stream_network_analysis::ExtractStreams::new())),
            "extractvalleys" => Some(Box::new(stream_network_analysis::ExtractValleys::new())),
            "rasterstreamstovector" => Some(Box::new(
                stream_network_analysis::RasterStreamsToVector::new(),
            )),
            "vectorstreamnetworkanalysis" => Some(Box::new(
                stream_network_analysis::VectorStreamNetworkAnalysis::new(),
            )),
            "strahlerorder" => Some(Box::new(stream_network_analysis::StrahlerOrder::new())),
            "hackorder" => Some(Box::new(stream_network_analysis::HackOrder::new())),
            "findmainstem" => Some(Box::new(stream_network_analysis::FindMainStem::new())),
            "longprofile" => Some(Box::new(stream_network_analysis::LongProfile::new())),
            "streamslopecontinuous" => Some(Box::new(
                stream_network_analysis::StreamSlopeContinuous::new(),
            )),
            "delineatereaches" => Some(Box::new(stream_network_analysis::DelineateReaches::new())),

            _ => None,
        }
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", get_help(tool)),
                None => {
                    return Err(Error::new(
                        ErrorKind::NotFound,
                        format!("Unrecognized tool name {}.", tool_name),
                    ))
                }
            }
        } else {
            for val in &self.tool_names {
                let tool = self.get_tool(val).unwrap();
                println!("{}\n", get_help(tool));
            }
        }
        Ok(())
    }

    pub fn tool_license(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(_tool) => {
                println!("MIT");
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}", tool.get_tool_parameters());
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }

    pub fn toolbox(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", tool.get_toolbox()),
                None => {
                    return Err(Error::new(
                        ErrorKind::NotFound,
                        format!("Unrecognized tool name {}.", tool_name),
                    ))
                }
            }
        } else {
            for val in &self.tool_names {
                let tool = self.get_tool(val).unwrap();
                println!("{}: {}", val, tool.get_toolbox());
            }
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            let tool = self
                .get_tool(val)
                .unwrap_or_else(|| panic!("Unrecognized tool name {}.", val));
            tool_details.push(get_name_and_description(tool));
        }
        tool_details.sort();

        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            let tool = self
                .get_tool(val)
                .unwrap_or_else(|| panic!("Unrecognized tool name {}.", val));
            let toolbox = tool.get_toolbox();
            let (nm, des) = get_name_and_description(tool);
            for kw in &keywords {
                if nm.to_lowercase().contains(&kw.to_lowercase())
                    || des.to_lowercase().contains(&kw.to_lowercase())
                    || toolbox.to_lowercase().contains(&kw.to_lowercase())
                {
                    tool_details.push((nm.clone(), des.clone()));
                    break;
                }
            }
        }

        let mut ret = format!("{} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn get_tool_source_code(&self, tool_name: String) -> Result<(), Error> {
        let repo = String::from("https://github.com/jblindsay/whitebox-tools/blob/master/");
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => {
                println!("{}{}", repo, tool.get_source_file());
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("Unrecognized tool name {}.", tool_name),
            )),
        }
    }
}

pub trait WhiteboxTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn get_source_file(&self) -> String;
    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn WhiteboxTool + 'a>) -> String {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters).unwrap();
    let a = o["parameters"].as_array().unwrap();
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    for d in a {
        let mut s = String::new();
        for f in d["flags"].as_array().unwrap() {
            s.push_str(&format!("{}, ", f.as_str().unwrap()));
        }
        p.push_str(&format!(
            "{:width$} {}\n",
            s.trim().trim_matches(','),
            d["description"].as_str().unwrap(),
            width = 18
        ));
    }
    let example = wt.get_example_usage();
    if example.len() <= 1 {
        format!(
            "{}\n\nDescription:\n{}\nToolbox: {}\nParameters:\n\n{}\n",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}\nDescription:\n{}\nToolbox: {}\nParameters:\n\n{}\n\nExample usage:\n{}\n",
            tool_name, description, toolbox, p, example
        )
    }
}

fn get_name_and_description<'a>(wt: Box<dyn WhiteboxTool + 'a>) -> (String, String) {
    (wt.get_tool_name(), wt.get_tool_description())
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

impl ToolParameter {
    pub fn to_string(&self) -> String {
        match serde_json::to_string(&self) {
            Ok(json_str) => json_str,
            Err(err) => format!("{:?}", err),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum ParameterType {
    Boolean,
    String,
    StringList,
    Integer,
    Float,
    ExistingFile(ParameterFileType),
    NewFile(ParameterFileType),
    OptionList(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum ParameterFileType {
    Raster,
    Vector(VectorGeometryType),
    Text,
    Csv,
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum VectorGeometryType {
    Point,
    Line,
    Polygon,
}
