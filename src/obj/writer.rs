// Object file writer
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of MLANG.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Element-level writer shared by object files.
//!
//! This is a thin layer over [`quick_xml::Writer`] that writes whole
//!   elements rather than individual events.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer as XmlWriter;
use std::io::Write;
use std::result;

pub type Result<T = ()> = result::Result<T, WriterError>;

/// Attributes of an element in the order that they are written.
pub type Attrs<'a> = &'a [(&'a str, &'a str)];

pub struct ElementWriter<W: Write> {
    writer: XmlWriter<W>,
}

impl<W: Write> ElementWriter<W> {
    pub fn new(write: W) -> Self {
        Self {
            writer: XmlWriter::new_with_indent(write, b' ', 2),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    pub fn write_decl(&mut self) -> Result<&mut Self> {
        self.writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("utf-8"),
            None,
        )))?;

        Ok(self)
    }

    /// Write an element
    ///
    /// This writes the opening tag, the content, and the closing tag for a
    ///   given element.
    /// The callback is what will write the element's body.
    pub fn write_element<F>(
        &mut self,
        name: &str,
        attrs: Attrs,
        callback: F,
    ) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.writer.write_event(Event::Start(start(name, attrs)))?;
        (callback)(self)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;

        Ok(self)
    }

    /// Write an element with no content.
    pub fn write_empty(
        &mut self,
        name: &str,
        attrs: Attrs,
    ) -> Result<&mut Self> {
        self.writer.write_event(Event::Empty(start(name, attrs)))?;

        Ok(self)
    }

    /// Write a container element holding one empty `child` element per
    ///   name,
    ///     each with a single `name` attribute.
    ///
    /// A container with no names is written as an empty element.
    pub fn write_names<'n, I>(
        &mut self,
        container: &str,
        child: &str,
        names: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'n String>,
    {
        self.write_names_with(container, &[], child, names)
    }

    /// Like [`Self::write_names`],
    ///   with attributes on the container.
    pub fn write_names_with<'n, I>(
        &mut self,
        container: &str,
        attrs: Attrs,
        child: &str,
        names: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'n String>,
    {
        let mut names = names.into_iter().peekable();

        if names.peek().is_none() {
            return self.write_empty(container, attrs);
        }

        self.write_element(container, attrs, |w| {
            for name in names {
                w.write_empty(child, &[("name", name.as_str())])?;
            }

            Ok(())
        })
    }
}

fn start<'a>(name: &'a str, attrs: Attrs<'a>) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(attrs.iter().copied())
}

#[derive(Debug)]
pub enum WriterError {
    /// Propagated IO error
    Io(std::io::Error),
    /// Propagated XML error
    XmlError(quick_xml::Error),
}

impl std::fmt::Display for WriterError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(inner) => inner.fmt(fmt),
            Self::XmlError(inner) => inner.fmt(fmt),
        }
    }
}

impl std::error::Error for WriterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(inner) => Some(inner),
            Self::XmlError(inner) => Some(inner),
        }
    }
}

impl From<std::io::Error> for WriterError {
    fn from(err: std::io::Error) -> Self {
        WriterError::Io(err)
    }
}

impl From<quick_xml::Error> for WriterError {
    fn from(err: quick_xml::Error) -> Self {
        WriterError::XmlError(err)
    }
}
