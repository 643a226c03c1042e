/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 25/06/2017
Last Modified: 18/10/2019
License: MIT
*/

use whitebox_raster::*;
use crate::tools::core_interop::{append_tail_cell, print_banner, to_core_i16, to_core_i32};
use crate::tools::*;
use std::collections::HashSet;
use std::env;
use std::f64;
use std::io::{Error, ErrorKind};
use std::path;
use whitebox_stream_network::dirmap::DirMap;
use whitebox_stream_network::graph::build_from_polylines;
use whitebox_stream_network::hack::hack_order as graph_hack_order;
use whitebox_stream_network::links::label_links;
use whitebox_stream_network::report::NullReporter;
use whitebox_stream_network::strahler::strahler_order;
use whitebox_stream_network::upstream_length_graph::upstream_length;

/// This tool can be used to assign the Hack stream order to each link in a stream network. According to this common
/// stream numbering system, the main stream is assigned an order of one. All tributaries to the main stream (i.e. the trunk)
/// are assigned an order of two; tributaries to second-order links are assigned an order of three, and so on. The trunk or
/// main stream of the stream network can be defined either based on the furthest upstream distance, at each bifurcation
/// (i.e. network junction).
///
/// Stream order is often used in hydro-geomorphic and ecological studies to quantify the relative size and importance of a
/// stream segment to the overall river system. Unlike some other stream ordering systems, e.g. Horton-Strahler stream order
/// (`StrahlerStreamOrder`) and Shreve's stream magnitude (`ShreveStreamMagnitude`), Hack's stream ordering method increases
/// from the catchment outlet towards the channel heads. This has the main advantage that the catchment outlet is likely to
/// be accurately located while the channel network extent may be less accurately mapped.
///
/// The user must specify the names of a streams raster image (`--streams`) and D8 pointer image (`--d8_pntr`). Stream cells
/// are designated in the streams image as all positive, nonzero values. Thus all non-stream or background grid cells are
/// commonly assigned either zeros or NoData values. The pointer image is used to traverse the stream network and should only
/// be created using the D8 algorithm. Background cells will be assigned the NoData value in the output image, unless the
/// `--zero_background` parameter is used, in which case non-stream cells will be assigned zero values in the output.
///
/// By default, the pointer raster is assumed to use the clockwise indexing method used by WhiteboxTools.
/// If the pointer file contains ESRI flow direction values instead, the `--esri_pntr` parameter must be specified.
///
/// # Reference
/// Hack, J. T. (1957). Studies of longitudinal stream profiles in Virginia and Maryland (Vol. 294). US Government
/// Printing Office.
///
/// # See Also
/// `HortonStreamOrder`, `StrahlerStreamOrder`, `ShreveStreamMagnitude`, `TopologicalStreamOrder`
pub struct HackStreamOrder {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl HackStreamOrder {
    pub fn new() -> HackStreamOrder {
        // public constructor
        let name = "HackStreamOrder".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description =
            "Assigns the Hack stream order to each tributary in a stream network.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input raster D8 pointer file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input Streams File".to_owned(),
            flags: vec!["--streams".to_owned()],
            description: "Input raster streams file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output raster file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Does the pointer file use the ESRI pointer scheme?".to_owned(),
            flags: vec!["--esri_pntr".to_owned()],
            description: "D8 pointer uses the ESRI style scheme.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Should a background value of zero be used?".to_owned(),
            flags: vec!["--zero_background".to_owned()],
            description: "Flag indicating whether a background value of zero should be used."
                .to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: None,
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut parent = env::current_exe().unwrap();
        parent.pop();
        let p = format!("{}", parent.display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace(".", "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --d8_pntr=D8.tif --streams=streams.tif -o=output.tif
>>.*{0} -r={1} -v --wd=\"*path*to*data*\" --d8_pntr=D8.tif --streams=streams.tif -o=output.tif --esri_pntr --zero_background", short_exe, name).replace("*", &sep);

        HackStreamOrder {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WhiteboxTool for HackStreamOrder {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        let mut s = String::from("{\"parameters\": [");
        for i in 0..self.parameters.len() {
            if i < self.parameters.len() - 1 {
                s.push_str(&(self.parameters[i].to_string()));
                s.push_str(",");
            } else {
                s.push_str(&(self.parameters[i].to_string()));
            }
        }
        s.push_str("]}");
        s
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut d8_file = String::new();
        let mut streams_file = String::new();
        let mut output_file = String::new();
        let mut esri_style = false;
        let mut background_val = f64::NEG_INFINITY;

        if args.len() == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace("\"", "");
            arg = arg.replace("\'", "");
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-d8_pntr" {
                d8_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-streams" {
                streams_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-esri_pntr" || flag_val == "-esri_style" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    esri_style = true;
                }
            } else if flag_val == "-zero_background" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    background_val = 0f64;
                }
            }
        }

        if verbose {
            print_banner(&self.get_tool_name());
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        if !d8_file.contains(&sep) && !d8_file.contains("/") {
            d8_file = format!("{}{}", working_directory, d8_file);
        }
        if !streams_file.contains(&sep) && !streams_file.contains("/") {
            streams_file = format!("{}{}", working_directory, streams_file);
        }
        if !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        if verbose {
            println!("Reading pointer data...")
        };
        let pntr = Raster::new(&d8_file, "r")?;
        let pntr_nodata = pntr.configs.nodata;
        if verbose {
            println!("Reading streams data...")
        };
        let streams = Raster::new(&streams_file, "r")?;

        let start = Instant::now();

        let rows = pntr.configs.rows as isize;
        let columns = pntr.configs.columns as isize;
        let nodata = streams.configs.nodata;
        if background_val == f64::NEG_INFINITY {
            background_val = nodata;
        }

        // make sure the input files have the same size
        if streams.configs.rows != pntr.configs.rows
            || streams.configs.columns != pntr.configs.columns
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input files must have the same number of rows and columns and spatial extent.",
            ));
        }

        let mut output = Raster::initialize_using_file(&output_file, &streams);
        output.reinitialize_values(background_val);

        let mut pntr_core = to_core_i16(&pntr);
        if !esri_style {
            const WB_TO_ESRI: [(i16, i16); 8] = [
                (1, 128),
                (2, 1),
                (4, 2),
                (8, 4),
                (16, 8),
                (32, 16),
                (64, 32),
                (128, 64),
            ];
            for row in 0..rows {
                for col in 0..columns {
                    let v = pntr_core.get(row, col);
                    if let Some(&(_, esri)) = WB_TO_ESRI.iter().find(|&&(wb, _)| wb == v) {
                        pntr_core.set(row, col, esri);
                    }
                }
            }
        }
        let streams_core = to_core_i32(&streams);

        if verbose {
            println!("Labeling stream links...")
        };
        let mut reporter = NullReporter;
        let link_labels = label_links(&streams_core, &pntr_core, &mut reporter, None)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;

        let mut segment_ids: Vec<u32> = link_labels
            .iter_cells()
            .map(|(r, c)| link_labels.get(r, c))
            .filter(|&v| v > 0)
            .collect();
        segment_ids.sort_unstable();
        segment_ids.dedup();

        let mut segment_paths: Vec<Vec<(isize, isize)>> = Vec::with_capacity(segment_ids.len());
        for &id in &segment_ids {
            let cells: Vec<(isize, isize)> = link_labels
                .iter_cells()
                .filter(|&(r, c)| link_labels.get(r, c) == id)
                .collect();
            let mask: HashSet<(isize, isize)> = cells.iter().copied().collect();
            let start_cell = cells
                .iter()
                .copied()
                .find(|&(r, c)| {
                    !cells.iter().any(|&(nr, nc)| {
                        (nr, nc) != (r, c) && {
                            let (dr, dc) = DirMap::step(pntr_core.get(nr, nc));
                            (nr + dr, nc + dc) == (r, c)
                        }
                    })
                })
                .unwrap_or(cells[0]);
            let mut path = whitebox_stream_network::walker::walk(start_cell, &pntr_core, |next| !mask.contains(&next));
            if path.len() < 2 {
                reporter.warn(&format!("link {} is a single isolated cell; skipped", id));
                continue;
            }
            // a confluence cell belongs to the downstream trunk link (links.rs), so
            // an arm's walk stops one cell short of it; extend to share the node.
            append_tail_cell(&mut path, &pntr_core);
            segment_paths.push(path);
        }

        let polylines: Vec<Vec<(f64, f64)>> = segment_paths
            .iter()
            .map(|path| path.iter().map(|&(r, c)| (c as f64, r as f64)).collect())
            .collect();
        let mut graph = build_from_polylines(&polylines);
        let to_io_err = |e: whitebox_stream_network::CoreError| Error::new(ErrorKind::InvalidInput, e.to_string());
        strahler_order(&mut graph, None).map_err(to_io_err)?;
        upstream_length(&mut graph, None).map_err(to_io_err)?;
        graph_hack_order(&mut graph).map_err(to_io_err)?;

        for (i, path) in segment_paths.iter().enumerate() {
            let order = graph.edge(i).attrs.hack_order.unwrap() as f64;
            for &(row, col) in path {
                output.set_value(row, col, order);
            }
        }

        for row in 0..rows {
            for col in 0..columns {
                if streams[(row, col)] <= 0.0 {
                    output[(row, col)] = if pntr[(row, col)] != pntr_nodata {
                        background_val
                    } else {
                        nodata
                    };
                }
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        output.configs.palette = "qual.plt".to_string();
        output.configs.photometric_interp = PhotometricInterpretation::Categorical;
        output.add_metadata_entry(format!(
            "Created by whitebox_tools\' {} tool",
            self.get_tool_name()
        ));
        output.add_metadata_entry(format!("Input d8 pointer file: {}", d8_file));
        output.add_metadata_entry(format!("Input streams file: {}", streams_file));
        output.add_metadata_entry(format!("Elapsed Time (excluding I/O): {}", elapsed_time));

        if verbose {
            println!("Saving data...")
        };
        let _ = match output.write() {
            Ok(_) => {
                if verbose {
                    println!("Output file written")
                }
            }
            Err(e) => return Err(e),
        };
        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}
